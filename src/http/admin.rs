use super::AppState;
use super::error::json_body;
use crate::errors::{AppError, AppResult};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword", default)]
    pub current_password: String,
    #[serde(rename = "newPassword", default)]
    pub new_password: String,
}

fn login_reply(status: StatusCode, success: bool, message: &str) -> Response {
    (
        status,
        Json(LoginResponse {
            success,
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Login answers with `{success, message}` on every outcome the client
/// handles, including the unconfigured case.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let body = match json_body(payload) {
        Ok(b) => b,
        Err(e) => return e.into_response(),
    };

    match state.credentials.verify(&body.username, &body.password).await {
        Ok(true) => {
            info!(user = %body.username, "admin login");
            login_reply(StatusCode::OK, true, "Login successful")
        }
        Ok(false) => {
            warn!(user = %body.username, "rejected admin login");
            login_reply(StatusCode::UNAUTHORIZED, false, "Invalid credentials")
        }
        Err(AppError::Unconfigured(message)) => {
            warn!("login attempted without configured credentials");
            login_reply(StatusCode::INTERNAL_SERVER_ERROR, false, &message)
        }
        Err(e) => e.into_response(),
    }
}

pub async fn change_password(
    State(state): State<AppState>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let body = json_body(payload)?;
    state
        .credentials
        .change_password(&body.current_password, &body.new_password)
        .await?;
    Ok(Json(
        json!({ "success": true, "message": "Password changed successfully" }),
    ))
}
