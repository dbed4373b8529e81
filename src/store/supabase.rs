//! Hosted store: Supabase tables through the PostgREST HTTP interface.
//!
//! PostgREST has no multi-statement transactions, so the atomic operations
//! are built from conditional requests:
//! - counter updates are optimistic: the `PATCH` is filtered on the values
//!   that were read, and an empty result means another writer got there
//!   first, so the read-modify-write is retried;
//! - a log insert that fails after an award is compensated by a conditional
//!   revert of the award;
//! - reset writes its log entry first and deletes it again if the bulk
//!   update fails.

use super::{Store, checked_counters};
use crate::config::Config;
use crate::core::scoring::Award;
use crate::errors::{AppError, AppResult};
use crate::models::activity::{ActivityLogEntry, NewLogEntry};
use crate::models::event_type::CounterField;
use crate::models::student::Student;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::{debug, error, warn};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_backoff_ms: 15,
        }
    }
}

pub struct SupabaseStore {
    client: Client,
    rest_url: String,
    retry: RetryPolicy,
}

#[derive(Deserialize)]
struct SettingRow {
    value: String,
}

impl SupabaseStore {
    pub fn new(url: &str, key: &str) -> AppResult<Self> {
        if url.trim().is_empty() || key.trim().is_empty() {
            return Err(AppError::Config(
                "Missing Supabase credentials: set SUPABASE_URL and SUPABASE_ANON_KEY".into(),
            ));
        }

        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(key)
            .map_err(|e| AppError::Config(format!("invalid Supabase key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| AppError::Config(format!("invalid Supabase key: {e}")))?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", url.trim_end_matches('/')),
            retry: RetryPolicy::default(),
        })
    }

    pub fn from_config(cfg: &Config) -> AppResult<Self> {
        Self::new(
            cfg.supabase_url.as_deref().unwrap_or_default(),
            cfg.supabase_key.as_deref().unwrap_or_default(),
        )
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    fn table(&self, name: &str) -> String {
        format!("{}/{}", self.rest_url, name)
    }

    fn returning(builder: RequestBuilder) -> RequestBuilder {
        builder.header("Prefer", "return=representation")
    }

    async fn fetch_student(&self, id: i64) -> AppResult<Option<Student>> {
        let resp = self
            .client
            .get(self.table("students"))
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))])
            .send()
            .await?;
        Ok(read_rows::<Student>(resp).await?.into_iter().next())
    }

    /// Conditional write: succeeds only when the row still holds the values
    /// the caller read. `Ok(None)` means the precondition no longer holds.
    async fn compare_and_set(
        &self,
        current: &Student,
        counter: CounterField,
        points: i64,
        value: i64,
    ) -> AppResult<Option<Student>> {
        let col = counter.column();
        let mut body = Map::new();
        body.insert("points".into(), json!(points));
        body.insert(col.into(), json!(value));

        let resp = Self::returning(self.client.patch(self.table("students")))
            .query(&[
                ("id", format!("eq.{}", current.id)),
                ("points", format!("eq.{}", current.points)),
                (col, format!("eq.{}", current.counter(counter))),
            ])
            .json(&Value::Object(body))
            .send()
            .await?;
        Ok(read_rows::<Student>(resp).await?.into_iter().next())
    }

    async fn optimistic_update(
        &self,
        id: i64,
        points_delta: i64,
        counter: CounterField,
        counter_delta: i64,
    ) -> AppResult<(Student, Student)> {
        for attempt in 0..self.retry.max_attempts {
            let current = self
                .fetch_student(id)
                .await?
                .ok_or_else(AppError::student_not_found)?;
            let (points, value) = checked_counters(&current, points_delta, counter, counter_delta)?;

            if let Some(updated) = self.compare_and_set(&current, counter, points, value).await? {
                return Ok((current, updated));
            }

            debug!(student = id, attempt, "concurrent update detected, retrying");
            let backoff = self.retry.base_backoff_ms * (attempt as u64 + 1);
            tokio::time::sleep(Duration::from_millis(backoff)).await;
        }
        Err(AppError::Contention(id))
    }

    async fn insert_log(&self, entry: &NewLogEntry) -> AppResult<ActivityLogEntry> {
        let resp = Self::returning(self.client.post(self.table("activity_log")))
            .json(entry)
            .send()
            .await?;
        read_rows::<ActivityLogEntry>(resp)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Other("activity log insert returned no row".into()))
    }

    async fn delete_log(&self, id: i64) -> AppResult<()> {
        let resp = self
            .client
            .delete(self.table("activity_log"))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        ensure_success(resp).await
    }
}

async fn ensure_success(resp: Response) -> AppResult<()> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(AppError::RemoteStatus {
        status: status.as_u16(),
        body,
    })
}

async fn read_rows<T: DeserializeOwned>(resp: Response) -> AppResult<Vec<T>> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AppError::RemoteStatus {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.json::<Vec<T>>().await?)
}

/// Postgres unique violations surface as 409 with SQLSTATE 23505.
fn is_unique_violation(status: StatusCode, body: &str) -> bool {
    status == StatusCode::CONFLICT || body.contains("23505")
}

#[async_trait]
impl Store for SupabaseStore {
    fn backend_tag(&self) -> &'static str {
        "supabase"
    }

    async fn list_students(&self) -> AppResult<Vec<Student>> {
        let resp = self
            .client
            .get(self.table("students"))
            .query(&[("select", "*"), ("order", "points.desc,id.asc")])
            .send()
            .await?;
        read_rows(resp).await
    }

    async fn get_student(&self, id: i64) -> AppResult<Student> {
        self.fetch_student(id)
            .await?
            .ok_or_else(AppError::student_not_found)
    }

    async fn create_student(&self, name: &str) -> AppResult<Student> {
        let resp = Self::returning(self.client.post(self.table("students")))
            .json(&json!({ "name": name }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if is_unique_violation(status, &body) {
                return Err(AppError::Conflict("Student name already exists".into()));
            }
            return Err(AppError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<Vec<Student>>()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Other("student insert returned no row".into()))
    }

    async fn delete_student(&self, id: i64) -> AppResult<()> {
        let resp = Self::returning(self.client.delete(self.table("students")))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        let removed: Vec<Student> = read_rows(resp).await?;
        if removed.is_empty() {
            return Err(AppError::student_not_found());
        }
        Ok(())
    }

    async fn update_student_counters(
        &self,
        id: i64,
        points_delta: i64,
        counter: CounterField,
        counter_delta: i64,
    ) -> AppResult<Student> {
        let (_, updated) = self
            .optimistic_update(id, points_delta, counter, counter_delta)
            .await?;
        Ok(updated)
    }

    async fn record_award(&self, id: i64, award: Award) -> AppResult<Student> {
        let (before, updated) = self
            .optimistic_update(id, award.points, award.counter, 1)
            .await?;

        let entry = NewLogEntry::award(id, &before.name, award.event, award.points);
        if let Err(log_err) = self.insert_log(&entry).await {
            warn!(student = id, error = %log_err, "activity log insert failed, reverting award");
            let revert = self
                .compare_and_set(
                    &updated,
                    award.counter,
                    before.points,
                    before.counter(award.counter),
                )
                .await;
            match revert {
                Ok(Some(_)) => {}
                Ok(None) => error!(student = id, "award revert lost a race; counters keep the award"),
                Err(e) => error!(student = id, error = %e, "award revert failed"),
            }
            return Err(log_err);
        }

        Ok(updated)
    }

    async fn reset_all_students(&self) -> AppResult<ActivityLogEntry> {
        // Readers can see this entry before the bulk PATCH lands. The order is
        // fixed because deleting a log row is the only undo PostgREST allows;
        // prior student values cannot be restored after a failed insert.
        let entry = self.insert_log(&NewLogEntry::reset()).await?;

        let zeroed = self
            .client
            .patch(self.table("students"))
            .query(&[("id", "not.is.null")])
            .json(&json!({
                "points": 0,
                "meetings": 0,
                "guestSpeaker": 0,
                "cfe": 0,
                "combo": 0,
            }))
            .send()
            .await;

        let outcome = match zeroed {
            Ok(resp) => ensure_success(resp).await,
            Err(e) => Err(e.into()),
        };

        if let Err(e) = outcome {
            if let Err(undo) = self.delete_log(entry.id).await {
                error!(log_id = entry.id, error = %undo, "failed to remove reset entry after failed reset");
            }
            return Err(e);
        }

        Ok(entry)
    }

    async fn append_log(&self, entry: NewLogEntry) -> AppResult<ActivityLogEntry> {
        self.insert_log(&entry).await
    }

    async fn list_log(&self, limit: i64) -> AppResult<Vec<ActivityLogEntry>> {
        let resp = self
            .client
            .get(self.table("activity_log"))
            .query(&[
                ("select", "*".to_string()),
                ("order", "timestamp.desc,id.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;
        read_rows(resp).await
    }

    async fn get_setting(&self, key: &str) -> AppResult<Option<String>> {
        let resp = self
            .client
            .get(self.table("settings"))
            .query(&[("select", "value".to_string()), ("key", format!("eq.{key}"))])
            .send()
            .await?;
        Ok(read_rows::<SettingRow>(resp)
            .await?
            .into_iter()
            .next()
            .map(|row| row.value))
    }

    async fn set_setting(&self, key: &str, value: &str) -> AppResult<()> {
        let resp = self
            .client
            .post(self.table("settings"))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&json!({ "key": key, "value": value }))
            .send()
            .await?;
        ensure_success(resp).await
    }

    async fn delete_setting(&self, key: &str) -> AppResult<()> {
        let resp = self
            .client
            .delete(self.table("settings"))
            .query(&[("key", format!("eq.{key}"))])
            .send()
            .await?;
        ensure_success(resp).await
    }
}
