use crate::core::roster::Standing;
use crate::errors::AppResult;
use csv::Writer;
use std::io::Write;

pub const HEADERS: [&str; 8] = [
    "Name",
    "Total Points",
    "Meetings",
    "Guest Speaker Events",
    "CfE Events",
    "Combo Events",
    "Tier",
    "Award Amount",
];

/// Write the standings table as CSV.
pub fn write_standings<W: Write>(out: W, rows: &[Standing]) -> AppResult<()> {
    let mut wtr = Writer::from_writer(out);

    wtr.write_record(HEADERS)?;

    for row in rows {
        wtr.write_record(&[
            row.name.clone(),
            row.points.to_string(),
            row.meetings.to_string(),
            row.guest_speaker.to_string(),
            row.cfe.to_string(),
            row.combo.to_string(),
            row.tier.name().to_string(),
            row.tier.award().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tier::Tier;

    fn standing(name: &str, points: i64) -> Standing {
        Standing {
            name: name.to_string(),
            points,
            meetings: points,
            guest_speaker: 0,
            cfe: 0,
            combo: 0,
            tier: Tier::for_points(points),
        }
    }

    #[test]
    fn header_and_rows() {
        let mut buf = Vec::new();
        write_standings(&mut buf, &[standing("Alice", 35), standing("Bob", 3)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Name,Total Points,Meetings,Guest Speaker Events,CfE Events,Combo Events,Tier,Award Amount"
        );
        assert_eq!(lines[1], "Alice,35,35,0,0,0,Gold,$1000");
        assert_eq!(lines[2], "Bob,3,3,0,0,0,None,$0");
    }

    #[test]
    fn names_with_commas_are_quoted() {
        let mut buf = Vec::new();
        write_standings(&mut buf, &[standing("Doe, Jane", 12)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"Doe, Jane\",12,12,0,0,0,Bronze,$250"));
    }
}
