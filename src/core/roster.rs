use crate::core::scoring::parse_award;
use crate::errors::{AppError, AppResult};
use crate::models::activity::ActivityLogEntry;
use crate::models::student::Student;
use crate::models::tier::Tier;
use crate::store::Store;
use serde::Serialize;

/// High-level business logic behind the student endpoints.
pub struct RosterLogic;

/// One row of the standings, tier resolved.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Standing {
    pub name: String,
    pub points: i64,
    pub meetings: i64,
    pub guest_speaker: i64,
    pub cfe: i64,
    pub combo: i64,
    pub tier: Tier,
}

impl From<&Student> for Standing {
    fn from(s: &Student) -> Self {
        Self {
            name: s.name.clone(),
            points: s.points,
            meetings: s.meetings,
            guest_speaker: s.guest_speaker,
            cfe: s.cfe,
            combo: s.combo,
            tier: s.tier(),
        }
    }
}

impl RosterLogic {
    pub async fn add_student(store: &dyn Store, raw_name: Option<&str>) -> AppResult<Student> {
        let name = raw_name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Student name is required".into()));
        }
        store.create_student(name).await
    }

    pub async fn remove_student(store: &dyn Store, raw_id: &str) -> AppResult<()> {
        let id = parse_student_id(raw_id)?;
        store.delete_student(id).await
    }

    /// The event type is checked before the student lookup, so an invalid
    /// type is reported even for a missing student.
    pub async fn award(
        store: &dyn Store,
        raw_id: &str,
        event_type: Option<&str>,
    ) -> AppResult<Student> {
        let award = parse_award(event_type.unwrap_or_default())?;
        let id = parse_student_id(raw_id)?;
        store.record_award(id, award).await
    }

    pub async fn reset(store: &dyn Store) -> AppResult<ActivityLogEntry> {
        store.reset_all_students().await
    }

    pub async fn activity(
        store: &dyn Store,
        raw_limit: Option<&str>,
        default_limit: i64,
    ) -> AppResult<Vec<ActivityLogEntry>> {
        let limit = parse_limit(raw_limit, default_limit)?;
        store.list_log(limit).await
    }

    pub async fn standings(store: &dyn Store) -> AppResult<Vec<Standing>> {
        let students = store.list_students().await?;
        Ok(students.iter().map(Standing::from).collect())
    }
}

/// Ids come from the URL; anything that is not an integer cannot name a
/// student.
pub fn parse_student_id(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::student_not_found())
}

pub fn parse_limit(raw: Option<&str>, default_limit: i64) -> AppResult<i64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default_limit),
        Some(s) => match s.parse::<i64>() {
            Ok(n) if n >= 0 => Ok(n),
            _ => Err(AppError::InvalidInput(
                "limit must be a non-negative integer".into(),
            )),
        },
    }
}
