use super::AppState;
use super::error::json_body;
use crate::core::roster::RosterLogic;
use crate::errors::AppResult;
use crate::models::activity::ActivityLogEntry;
use crate::models::student::Student;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct NewStudent {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AwardRequest {
    #[serde(rename = "eventType")]
    pub event_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub limit: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Student>>> {
    Ok(Json(state.store.list_students().await?))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewStudent>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Student>)> {
    let body = json_body(payload)?;
    let student = RosterLogic::add_student(state.store.as_ref(), body.name.as_deref()).await?;
    info!(id = student.id, name = %student.name, "student added");
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    RosterLogic::remove_student(state.store.as_ref(), &id).await?;
    info!(id = %id, "student removed");
    Ok(Json(json!({ "message": "Student removed successfully" })))
}

pub async fn award(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AwardRequest>, JsonRejection>,
) -> AppResult<Json<Student>> {
    let body = json_body(payload)?;
    let student =
        RosterLogic::award(state.store.as_ref(), &id, body.event_type.as_deref()).await?;
    info!(
        id = student.id,
        event = body.event_type.as_deref().unwrap_or_default(),
        points = student.points,
        "points awarded"
    );
    Ok(Json(student))
}

pub async fn activity_log(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> AppResult<Json<Vec<ActivityLogEntry>>> {
    let entries = RosterLogic::activity(
        state.store.as_ref(),
        query.limit.as_deref(),
        state.activity_log_limit,
    )
    .await?;
    Ok(Json(entries))
}

pub async fn reset(State(state): State<AppState>) -> AppResult<Json<Value>> {
    RosterLogic::reset(state.store.as_ref()).await?;
    info!("all points reset");
    Ok(Json(json!({ "message": "All points reset successfully" })))
}
