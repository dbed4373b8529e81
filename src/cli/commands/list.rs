use crate::config::Config;
use crate::core::roster::{RosterLogic, Standing};
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::{header, info};
use crate::ui::table::{Column, Table};

pub async fn handle(cfg: &Config) -> AppResult<()> {
    let store = open_store(cfg)?;
    let standings = RosterLogic::standings(store.as_ref()).await?;

    if standings.is_empty() {
        info("No students yet.");
        return Ok(());
    }

    header("STANDINGS");
    print!("{}", render(&standings));
    Ok(())
}

fn render(standings: &[Standing]) -> String {
    let mut table = Table::new(vec![
        Column::right("#"),
        Column::left("Name"),
        Column::right("Points"),
        Column::right("Meetings"),
        Column::right("Guest"),
        Column::right("CFE"),
        Column::right("Combo"),
        Column::left("Tier"),
        Column::right("Award"),
    ]);

    for (rank, s) in standings.iter().enumerate() {
        let tier = if s.tier.conference_eligible() {
            format!("{} (+ conference)", s.tier.name())
        } else {
            s.tier.name().to_string()
        };
        table.add_row(vec![
            (rank + 1).to_string(),
            s.name.clone(),
            s.points.to_string(),
            s.meetings.to_string(),
            s.guest_speaker.to_string(),
            s.cfe.to_string(),
            s.combo.to_string(),
            tier,
            s.tier.award().to_string(),
        ]);
    }

    table.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tier::Tier;

    #[test]
    fn gold_rows_mention_the_conference() {
        let rows = vec![Standing {
            name: "Ana".into(),
            points: 36,
            meetings: 2,
            guest_speaker: 1,
            cfe: 0,
            combo: 4,
            tier: Tier::Gold,
        }];
        let out = render(&rows);
        assert!(out.contains("Gold (+ conference)"));
        assert!(out.contains("$1000"));
    }
}
