//! Persistence adapter.
//!
//! Handlers only ever see `Arc<dyn Store>`; which implementation sits behind
//! it is decided once, in [`open_store`], from the configured backend.
//!
//! Contract shared by every backend:
//! - mutations are durable before they return `Ok`;
//! - `record_award` and `reset_all_students` are atomic units, a failure
//!   leaves no partial write behind;
//! - concurrent `update_student_counters` / `record_award` calls on one
//!   student never lose an increment;
//! - reads return owned snapshots.

pub mod sqlite;
pub mod supabase;

use crate::config::{Backend, Config};
use crate::core::scoring::Award;
use crate::errors::AppResult;
use crate::models::activity::{ActivityLogEntry, NewLogEntry};
use crate::models::event_type::CounterField;
use crate::models::student::Student;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;

pub use sqlite::SqliteStore;
pub use supabase::SupabaseStore;

#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Short backend name reported by the health endpoint.
    fn backend_tag(&self) -> &'static str;

    /// All students, highest points first.
    async fn list_students(&self) -> AppResult<Vec<Student>>;

    async fn get_student(&self, id: i64) -> AppResult<Student>;

    /// Conflict when `name` is already taken (exact match).
    async fn create_student(&self, name: &str) -> AppResult<Student>;

    /// NotFound when absent. Log entries referencing the student stay.
    async fn delete_student(&self, id: i64) -> AppResult<()>;

    /// Serialized read-modify-write of one student's points and one counter.
    async fn update_student_counters(
        &self,
        id: i64,
        points_delta: i64,
        counter: CounterField,
        counter_delta: i64,
    ) -> AppResult<Student>;

    /// Apply an award and append its log entry as one unit.
    async fn record_award(&self, id: i64, award: Award) -> AppResult<Student>;

    /// Zero every student, then append the system reset entry.
    async fn reset_all_students(&self) -> AppResult<ActivityLogEntry>;

    async fn append_log(&self, entry: NewLogEntry) -> AppResult<ActivityLogEntry>;

    /// Newest first, at most `limit` entries.
    async fn list_log(&self, limit: i64) -> AppResult<Vec<ActivityLogEntry>>;

    async fn get_setting(&self, key: &str) -> AppResult<Option<String>>;

    /// Insert or overwrite.
    async fn set_setting(&self, key: &str, value: &str) -> AppResult<()>;

    async fn delete_setting(&self, key: &str) -> AppResult<()>;
}

/// Build the configured backend.
pub fn open_store(cfg: &Config) -> AppResult<Arc<dyn Store>> {
    match cfg.backend {
        Backend::Sqlite => Ok(Arc::new(SqliteStore::open(&cfg.database)?)),
        Backend::Supabase => Ok(Arc::new(SupabaseStore::from_config(cfg)?)),
    }
}

/// Timestamp format written by every backend (RFC 3339, UTC, millis).
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Shared guard for the counter invariants (points and counters never drop
/// below zero).
pub(crate) fn checked_counters(
    student: &Student,
    points_delta: i64,
    counter: CounterField,
    counter_delta: i64,
) -> AppResult<(i64, i64)> {
    let points = student.points + points_delta;
    let value = student.counter(counter) + counter_delta;
    if points < 0 || value < 0 {
        return Err(crate::errors::AppError::InvalidInput(format!(
            "update would make {} negative for student {}",
            if points < 0 { "points" } else { counter.column() },
            student.id
        )));
    }
    Ok((points, value))
}
