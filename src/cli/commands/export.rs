use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::roster::RosterLogic;
use crate::errors::AppResult;
use crate::export::{default_file_name, export_standings};
use crate::store::open_store;
use chrono::Local;
use std::path::PathBuf;

pub async fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        force,
    } = cmd
    {
        let store = open_store(cfg)?;
        let standings = RosterLogic::standings(store.as_ref()).await?;

        let path = file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(default_file_name(Local::now().date_naive(), *format)));

        export_standings(&path, &standings, *format, *force)?;
    }
    Ok(())
}
