#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use pointstracker::config::Config;
use pointstracker::core::scoring::award_for;
use pointstracker::http::{AppState, build_router};
use pointstracker::models::event_type::EventType;
use pointstracker::store::{SqliteStore, Store};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

pub fn pt() -> Command {
    cargo_bin_cmd!("pointstracker")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_pointstracker.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// A config path that never exists, so a developer's own config file cannot
/// leak into the run.
pub fn no_config(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_missing_pointstracker.conf", name));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_pointstracker_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize the DB through the CLI, then add students with the given
/// awards through the library store.
pub fn init_db_with_data(db_path: &str, students: &[(&str, &[EventType])]) {
    pt()
        .args(["--db", db_path, "--config", &no_config("seed"), "--test", "init"])
        .assert()
        .success();

    let rt = tokio::runtime::Runtime::new().expect("runtime");
    rt.block_on(async {
        let store = SqliteStore::open(db_path).expect("open db");
        for (name, events) in students {
            let st = store.create_student(name).await.expect("create student");
            for ev in events.iter() {
                store
                    .record_award(st.id, award_for(*ev))
                    .await
                    .expect("award");
            }
        }
    });
}

/// Config with a cheap password hash so HTTP tests stay fast.
pub fn test_config() -> Config {
    Config {
        hash_memory_kib: 8,
        hash_iterations: 1,
        hash_parallelism: 1,
        ..Config::default()
    }
}

/// Serve the API over an in-memory store on an ephemeral port.
///
/// Credentials are bootstrapped as admin / admin123.
pub async fn spawn_app(static_dir: Option<&str>) -> (String, Arc<dyn Store>) {
    let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().expect("in-memory store"));
    let state = AppState::new(Arc::clone(&store), &test_config());
    state
        .credentials
        .ensure_bootstrap("admin", "admin123")
        .await
        .expect("bootstrap");

    let app = build_router(state, static_dir);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    (format!("http://{addr}"), store)
}
