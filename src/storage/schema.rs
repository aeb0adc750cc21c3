//! Table definitions and connection pragmas.

use rusqlite::Connection;
use std::time::Duration;

/// Idempotent DDL for the three gradebook tables.
///
/// Result uniqueness per (student, quiz) is deliberately not a constraint here;
/// the gateway checks it before inserting.
pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS students (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS quizzes (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    subject        TEXT NOT NULL,
    num_questions  INTEGER NOT NULL,
    quiz_date      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS results (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id  INTEGER NOT NULL REFERENCES students(id),
    quiz_id     INTEGER NOT NULL REFERENCES quizzes(id),
    score       INTEGER NOT NULL CHECK (score BETWEEN 0 AND 100)
);

CREATE INDEX IF NOT EXISTS idx_results_student ON results(student_id);
CREATE INDEX IF NOT EXISTS idx_results_quiz ON results(quiz_id);
";

/// Per-connection settings applied whenever the pool opens a connection.
pub fn apply_pragmas(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(busy_timeout)?;
    // journal_mode answers with a row, so it cannot go through execute().
    let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    Ok(())
}

/// Create any missing tables.
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
