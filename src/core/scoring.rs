//! Point accrual rules.

use crate::errors::{AppError, AppResult};
use crate::models::event_type::{CounterField, EventType};

/// Everything a store needs to apply one award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    pub event: EventType,
    pub points: i64,
    pub counter: CounterField,
}

pub fn point_value(event: EventType) -> i64 {
    match event {
        EventType::Meeting => 1,
        EventType::GuestSpeaker => 3,
        EventType::Cfe => 3,
        EventType::Combo => 4,
    }
}

pub fn award_for(event: EventType) -> Award {
    Award {
        event,
        points: point_value(event),
        counter: event.counter(),
    }
}

/// Resolve a wire event type into its award, or InvalidInput.
pub fn parse_award(event_type: &str) -> AppResult<Award> {
    EventType::from_wire(event_type)
        .map(award_for)
        .ok_or_else(|| AppError::InvalidInput("Invalid event type".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_table() {
        let table: Vec<(&str, i64, &str)> = EventType::ALL
            .iter()
            .map(|ev| {
                let a = award_for(*ev);
                (ev.as_wire(), a.points, a.counter.column())
            })
            .collect();

        assert_eq!(
            table,
            vec![
                ("meeting", 1, "meetings"),
                ("guestSpeaker", 3, "guestSpeaker"),
                ("cfe", 3, "cfe"),
                ("combo", 4, "combo"),
            ]
        );
    }

    #[test]
    fn unknown_event_is_invalid_input() {
        let err = parse_award("bogus").unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref m) if m == "Invalid event type"));
        assert!(parse_award("").is_err());
    }
}
