//! Activity log rows: the append-only audit trail of point changes.

use super::event_type::EventType;
use serde::{Deserialize, Serialize};

/// `student_id` used for bulk operations that touch every student.
pub const SYSTEM_STUDENT_ID: i64 = 0;
pub const SYSTEM_STUDENT_NAME: &str = "SYSTEM";
pub const RESET_EVENT: &str = "reset";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityLogEntry {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub event_type: String,
    pub points_added: i64,
    pub timestamp: String,
}

/// Log entry before the backend assigns `id` and `timestamp`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewLogEntry {
    pub student_id: i64,
    pub student_name: String,
    pub event_type: String,
    pub points_added: i64,
}

impl NewLogEntry {
    pub fn award(student_id: i64, student_name: &str, event: EventType, points: i64) -> Self {
        Self {
            student_id,
            student_name: student_name.to_string(),
            event_type: event.as_wire().to_string(),
            points_added: points,
        }
    }

    pub fn reset() -> Self {
        Self {
            student_id: SYSTEM_STUDENT_ID,
            student_name: SYSTEM_STUDENT_NAME.to_string(),
            event_type: RESET_EVENT.to_string(),
            points_added: 0,
        }
    }
}
