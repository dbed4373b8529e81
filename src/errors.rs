//! Unified application error type.
//! Every layer (store, core, http, cli) returns AppError so that the HTTP
//! status mapping and the CLI error output stay in one place.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Persistence backends
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Remote backend error: {0}")]
    Remote(#[from] reqwest::Error),

    #[error("Remote backend returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("Concurrent update on student {0} did not settle")]
    Contention(i64),

    // ---------------------------
    // Request / domain errors
    // ---------------------------
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Unconfigured(String),

    // ---------------------------
    // Credentials
    // ---------------------------
    #[error("Password hashing error: {0}")]
    Hash(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    pub fn student_not_found() -> Self {
        AppError::NotFound("Student not found".into())
    }

    pub fn credentials_unconfigured() -> Self {
        AppError::Unconfigured("Admin credentials not configured".into())
    }

    /// HTTP status code for this error, per the API error taxonomy.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) | AppError::Conflict(_) => 400,
            AppError::Unauthorized(_) => 401,
            AppError::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// True for the errors that describe the caller's request rather than a
    /// server fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Other(format!("blocking task failed: {e}"))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_http_status() {
        assert_eq!(AppError::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(AppError::Conflict("x".into()).status_code(), 400);
        assert_eq!(AppError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(AppError::student_not_found().status_code(), 404);
        assert_eq!(AppError::credentials_unconfigured().status_code(), 500);
        assert_eq!(AppError::Contention(3).status_code(), 500);
        assert!(!AppError::Other("boom".into()).is_client_error());
    }

    #[test]
    fn domain_errors_display_their_message_verbatim() {
        assert_eq!(
            AppError::student_not_found().to_string(),
            "Student not found"
        );
    }
}
