use rusqlite::{Connection, Result};
use tracing::info;

/// Schema version stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Create the three tables. Column names match databases written by the
/// earlier Node server, so an existing `database.db` can be opened as is.
fn create_base_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            name         TEXT NOT NULL UNIQUE,
            points       INTEGER NOT NULL DEFAULT 0,
            meetings     INTEGER NOT NULL DEFAULT 0,
            guestSpeaker INTEGER NOT NULL DEFAULT 0,
            cfe          INTEGER NOT NULL DEFAULT 0,
            combo        INTEGER NOT NULL DEFAULT 0,
            created_at   DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS activity_log (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id   INTEGER NOT NULL,
            student_name TEXT NOT NULL,
            event_type   TEXT NOT NULL,
            points_added INTEGER NOT NULL,
            timestamp    DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS settings (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )
}

fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_students_points ON students(points DESC);
        CREATE INDEX IF NOT EXISTS idx_activity_log_timestamp ON activity_log(timestamp DESC);
        "#,
    )
}

pub fn schema_version(conn: &Connection) -> Result<i64> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

/// Public entry point: run all pending migrations.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    let current = schema_version(conn)?;
    if current >= SCHEMA_VERSION {
        return Ok(());
    }

    create_base_schema(conn)?;
    create_indexes(conn)?;
    conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;

    info!(from = current, to = SCHEMA_VERSION, "database schema migrated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        run_pending_migrations(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
                 AND name IN ('students','activity_log','settings')",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[test]
    fn legacy_unversioned_schema_is_adopted() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE students (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE,
                points INTEGER DEFAULT 0, meetings INTEGER DEFAULT 0, guestSpeaker INTEGER DEFAULT 0,
                cfe INTEGER DEFAULT 0, combo INTEGER DEFAULT 0, created_at DATETIME DEFAULT CURRENT_TIMESTAMP);
             INSERT INTO students (name, points) VALUES ('Legacy', 7);",
        )
        .unwrap();

        run_pending_migrations(&conn).unwrap();

        let points: i64 = conn
            .query_row("SELECT points FROM students WHERE name='Legacy'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(points, 7);
    }
}
