//! Embedded, file-backed store.
//!
//! One connection behind a mutex; every call runs on the blocking pool and
//! every mutation commits an `IMMEDIATE` transaction before returning, so
//! writes from this process are serialized and writes from other processes
//! wait on SQLite's own lock.

use super::{Store, checked_counters, now_timestamp};
use crate::core::scoring::Award;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::activity::{ActivityLogEntry, NewLogEntry};
use crate::models::event_type::CounterField;
use crate::models::student::Student;
use async_trait::async_trait;
use rusqlite::TransactionBehavior;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<Mutex<DbPool>>,
}

impl SqliteStore {
    /// Open (or create) the database file and bring its schema up to date.
    pub fn open(path: &str) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        init_db(&pool.conn)?;
        Ok(Self::from_pool(pool))
    }

    pub fn in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        init_db(&pool.conn)?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: DbPool) -> Self {
        Self {
            pool: Arc::new(Mutex::new(pool)),
        }
    }

    async fn with_pool<F, T>(&self, func: F) -> AppResult<T>
    where
        F: FnOnce(&mut DbPool) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        tokio::task::spawn_blocking(move || {
            let mut guard = pool
                .lock()
                .map_err(|_| AppError::Other("sqlite connection lock poisoned".into()))?;
            func(&mut guard)
        })
        .await?
    }
}

fn apply_counters(
    conn: &rusqlite::Connection,
    id: i64,
    points_delta: i64,
    counter: CounterField,
    counter_delta: i64,
) -> AppResult<Student> {
    let student = queries::find_student(conn, id)?.ok_or_else(AppError::student_not_found)?;
    let (points, value) = checked_counters(&student, points_delta, counter, counter_delta)?;
    queries::write_counters(conn, id, points, counter, value)?;
    queries::find_student(conn, id)?.ok_or_else(AppError::student_not_found)
}

#[async_trait]
impl Store for SqliteStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn list_students(&self) -> AppResult<Vec<Student>> {
        self.with_pool(|pool| queries::list_students(&pool.conn)).await
    }

    async fn get_student(&self, id: i64) -> AppResult<Student> {
        self.with_pool(move |pool| {
            queries::find_student(&pool.conn, id)?.ok_or_else(AppError::student_not_found)
        })
        .await
    }

    async fn create_student(&self, name: &str) -> AppResult<Student> {
        let name = name.to_string();
        self.with_pool(move |pool| {
            let tx = pool
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            let student = queries::insert_student(&tx, &name, &now_timestamp())?;
            tx.commit()?;
            Ok(student)
        })
        .await
    }

    async fn delete_student(&self, id: i64) -> AppResult<()> {
        self.with_pool(move |pool| {
            let removed = queries::delete_student(&pool.conn, id)?;
            if removed == 0 {
                return Err(AppError::student_not_found());
            }
            Ok(())
        })
        .await
    }

    async fn update_student_counters(
        &self,
        id: i64,
        points_delta: i64,
        counter: CounterField,
        counter_delta: i64,
    ) -> AppResult<Student> {
        self.with_pool(move |pool| {
            let tx = pool
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            let student = apply_counters(&tx, id, points_delta, counter, counter_delta)?;
            tx.commit()?;
            Ok(student)
        })
        .await
    }

    async fn record_award(&self, id: i64, award: Award) -> AppResult<Student> {
        self.with_pool(move |pool| {
            let tx = pool
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            let student = apply_counters(&tx, id, award.points, award.counter, 1)?;
            let entry = NewLogEntry::award(id, &student.name, award.event, award.points);
            queries::insert_log(&tx, &entry, &now_timestamp())?;
            tx.commit()?;
            Ok(student)
        })
        .await
    }

    async fn reset_all_students(&self) -> AppResult<ActivityLogEntry> {
        self.with_pool(|pool| {
            let tx = pool
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;
            queries::reset_students(&tx)?;
            let entry = queries::insert_log(&tx, &NewLogEntry::reset(), &now_timestamp())?;
            tx.commit()?;
            Ok(entry)
        })
        .await
    }

    async fn append_log(&self, entry: NewLogEntry) -> AppResult<ActivityLogEntry> {
        self.with_pool(move |pool| queries::insert_log(&pool.conn, &entry, &now_timestamp()))
            .await
    }

    async fn list_log(&self, limit: i64) -> AppResult<Vec<ActivityLogEntry>> {
        self.with_pool(move |pool| queries::list_log(&pool.conn, limit))
            .await
    }

    async fn get_setting(&self, key: &str) -> AppResult<Option<String>> {
        let key = key.to_string();
        self.with_pool(move |pool| queries::get_setting(&pool.conn, &key))
            .await
    }

    async fn set_setting(&self, key: &str, value: &str) -> AppResult<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.with_pool(move |pool| queries::set_setting(&pool.conn, &key, &value))
            .await
    }

    async fn delete_setting(&self, key: &str) -> AppResult<()> {
        let key = key.to_string();
        self.with_pool(move |pool| queries::delete_setting(&pool.conn, &key).map(|_| ()))
            .await
    }
}
