use crate::db::migrate::{SCHEMA_VERSION, run_pending_migrations, schema_version};
use crate::errors::{AppError, AppResult};
use rusqlite::Connection;

/// Bring the schema up to date and return its version.
///
/// A database written by a newer build is refused rather than guessed at.
pub fn init_db(conn: &Connection) -> AppResult<i64> {
    let found = schema_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(AppError::Migration(format!(
            "database schema version {found} is newer than supported ({SCHEMA_VERSION})"
        )));
    }

    run_pending_migrations(conn).map_err(|e| AppError::Migration(e.to_string()))?;
    Ok(schema_version(conn)?)
}
