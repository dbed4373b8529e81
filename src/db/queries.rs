use crate::errors::{AppError, AppResult};
use crate::models::activity::{ActivityLogEntry, NewLogEntry};
use crate::models::event_type::CounterField;
use crate::models::student::Student;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Result, Row, params};

const STUDENT_COLUMNS: &str = "id, name, points, meetings, guestSpeaker, cfe, combo, created_at";
const LOG_COLUMNS: &str = "id, student_id, student_name, event_type, points_added, timestamp";

pub fn map_student(row: &Row) -> Result<Student> {
    Ok(Student {
        id: row.get("id")?,
        name: row.get("name")?,
        points: row.get::<_, Option<i64>>("points")?.unwrap_or(0),
        meetings: row.get::<_, Option<i64>>("meetings")?.unwrap_or(0),
        guest_speaker: row.get::<_, Option<i64>>("guestSpeaker")?.unwrap_or(0),
        cfe: row.get::<_, Option<i64>>("cfe")?.unwrap_or(0),
        combo: row.get::<_, Option<i64>>("combo")?.unwrap_or(0),
        created_at: row.get("created_at")?,
    })
}

pub fn map_log(row: &Row) -> Result<ActivityLogEntry> {
    Ok(ActivityLogEntry {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        student_name: row.get("student_name")?,
        event_type: row.get("event_type")?,
        points_added: row.get("points_added")?,
        timestamp: row.get::<_, Option<String>>("timestamp")?.unwrap_or_default(),
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

// ---------------------------
// Students
// ---------------------------

pub fn list_students(conn: &Connection) -> AppResult<Vec<Student>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {STUDENT_COLUMNS} FROM students ORDER BY points DESC, id ASC"
    ))?;

    let rows = stmt.query_map([], map_student)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn find_student(conn: &Connection, id: i64) -> AppResult<Option<Student>> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"))?;
    Ok(stmt.query_row([id], map_student).optional()?)
}

pub fn insert_student(conn: &Connection, name: &str, created_at: &str) -> AppResult<Student> {
    let inserted = conn.execute(
        "INSERT INTO students (name, created_at) VALUES (?1, ?2)",
        params![name, created_at],
    );

    match inserted {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::Conflict("Student name already exists".into()));
        }
        Err(e) => return Err(e.into()),
    }

    let id = conn.last_insert_rowid();
    find_student(conn, id)?.ok_or_else(|| AppError::Other(format!("student {id} vanished after insert")))
}

pub fn delete_student(conn: &Connection, id: i64) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM students WHERE id = ?1", [id])?)
}

/// Write absolute point and counter values for one student.
pub fn write_counters(
    conn: &Connection,
    id: i64,
    points: i64,
    field: CounterField,
    counter: i64,
) -> AppResult<usize> {
    // The column name comes from a closed enum, never from the request.
    let sql = format!(
        "UPDATE students SET points = ?1, {col} = ?2 WHERE id = ?3",
        col = field.column()
    );
    Ok(conn.execute(&sql, params![points, counter, id])?)
}

pub fn reset_students(conn: &Connection) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE students SET points = 0, meetings = 0, guestSpeaker = 0, cfe = 0, combo = 0",
        [],
    )?)
}

// ---------------------------
// Activity log
// ---------------------------

pub fn insert_log(
    conn: &Connection,
    entry: &NewLogEntry,
    timestamp: &str,
) -> AppResult<ActivityLogEntry> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO activity_log (student_id, student_name, event_type, points_added, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    stmt.execute(params![
        entry.student_id,
        entry.student_name,
        entry.event_type,
        entry.points_added,
        timestamp,
    ])?;

    Ok(ActivityLogEntry {
        id: conn.last_insert_rowid(),
        student_id: entry.student_id,
        student_name: entry.student_name.clone(),
        event_type: entry.event_type.clone(),
        points_added: entry.points_added,
        timestamp: timestamp.to_string(),
    })
}

pub fn list_log(conn: &Connection, limit: i64) -> AppResult<Vec<ActivityLogEntry>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {LOG_COLUMNS} FROM activity_log ORDER BY timestamp DESC, id DESC LIMIT ?1"
    ))?;

    let rows = stmt.query_map([limit], map_log)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------
// Settings
// ---------------------------

pub fn get_setting(conn: &Connection, key: &str) -> AppResult<Option<String>> {
    let mut stmt = conn.prepare_cached("SELECT value FROM settings WHERE key = ?1")?;
    Ok(stmt.query_row([key], |row| row.get(0)).optional()?)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn delete_setting(conn: &Connection, key: &str) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM settings WHERE key = ?1", [key])?)
}
