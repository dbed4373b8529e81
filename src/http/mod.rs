//! REST API.
//!
//! Handlers are stateless: everything they touch comes in through
//! [`AppState`], which holds the store chosen at startup.

pub mod admin;
pub mod error;
pub mod students;

use crate::config::Config;
use crate::core::auth::{Credentials, HashCost};
use crate::errors::{AppError, AppResult};
use crate::store::{Store, now_timestamp};
use axum::extract::State;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub credentials: Credentials,
    pub activity_log_limit: i64,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, cfg: &Config) -> Self {
        let credentials = Credentials::new(Arc::clone(&store), HashCost::from_config(cfg));
        Self {
            store,
            credentials,
            activity_log_limit: cfg.activity_log_limit,
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": now_timestamp(),
        "database": state.store.backend_tag(),
    }))
}

/// Unmatched `/api/...` paths answer 404 `{error}` instead of reaching the
/// front end fallback.
async fn api_not_found() -> AppError {
    AppError::NotFound("Not found".into())
}

pub fn build_router(state: AppState, static_dir: Option<&str>) -> Router {
    let api = Router::new()
        .route("/students", get(students::list).post(students::create))
        .route("/students/:id", delete(students::remove))
        .route("/students/:id/points", post(students::award))
        .route("/activity-log", get(students::activity_log))
        .route("/reset", post(students::reset))
        .route("/login", post(admin::login))
        .route("/change-password", post(admin::change_password))
        .route("/health", get(health))
        .fallback(api_not_found);

    let app = Router::new().nest("/api", api).with_state(state);

    // Single-page front end: unknown non-API paths fall back to index.html.
    let app = match static_dir {
        Some(dir) => {
            let index = Path::new(dir).join("index.html");
            app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => app,
    };

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bootstrap credentials, bind and serve until Ctrl+C / SIGTERM.
pub async fn serve(cfg: &Config, store: Arc<dyn Store>) -> AppResult<()> {
    let state = AppState::new(Arc::clone(&store), cfg);
    state
        .credentials
        .ensure_bootstrap(&cfg.admin_username, &cfg.admin_password)
        .await?;

    let app = build_router(state, cfg.static_dir.as_deref());

    let address = cfg.bind_address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!(database = store.backend_tag(), "Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
