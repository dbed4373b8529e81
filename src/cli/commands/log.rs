use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::roster::RosterLogic;
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::{header, info};
use crate::ui::table::{Column, Table};

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log { limit } = cmd {
        let store = open_store(cfg)?;
        let limit = limit.map(|l| l.to_string());
        let entries =
            RosterLogic::activity(store.as_ref(), limit.as_deref(), cfg.activity_log_limit)
                .await?;

        if entries.is_empty() {
            info("Activity log is empty.");
            return Ok(());
        }

        header("ACTIVITY LOG");
        let mut table = Table::new(vec![
            Column::right("ID"),
            Column::left("Timestamp"),
            Column::left("Student"),
            Column::left("Event"),
            Column::right("Points"),
        ]);
        for e in &entries {
            table.add_row(vec![
                e.id.to_string(),
                e.timestamp.clone(),
                e.student_name.clone(),
                e.event_type.clone(),
                format!("{:+}", e.points_added),
            ]);
        }
        print!("{}", table.render());
    }
    Ok(())
}
