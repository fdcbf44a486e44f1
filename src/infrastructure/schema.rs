//! Table definitions and row mapping shared by the SQL backends.
//!
//! The schema is created if absent on startup. There is no migration
//! support: an existing `todos` table is left untouched.

use chrono::{DateTime, Utc};

use crate::domain::{Priority, Timestamp, Todo, TodoId};
use crate::infrastructure::RepositoryError;

/// DDL for SQLite, executed statement by statement.
pub const SQLITE_SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title VARCHAR(200) NOT NULL,
        description TEXT,
        completed BOOLEAN NOT NULL DEFAULT 0,
        priority VARCHAR(10) NOT NULL DEFAULT 'medium',
        created_at DATETIME NOT NULL,
        updated_at DATETIME,
        due_date DATETIME
    )",
    "CREATE INDEX IF NOT EXISTS ix_todos_title ON todos (title)",
    "CREATE INDEX IF NOT EXISTS ix_todos_created_at ON todos (created_at)",
];

/// DDL for `PostgreSQL`, executed statement by statement.
pub const POSTGRES_SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS todos (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(200) NOT NULL,
        description TEXT,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        priority VARCHAR(10) NOT NULL DEFAULT 'medium',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ,
        due_date TIMESTAMPTZ
    )",
    "CREATE INDEX IF NOT EXISTS ix_todos_title ON todos (title)",
    "CREATE INDEX IF NOT EXISTS ix_todos_created_at ON todos (created_at)",
];

/// Column list used by every `SELECT` and `RETURNING` clause.
pub const TODO_COLUMNS: &str =
    "id, title, description, completed, priority, created_at, updated_at, due_date";

/// A `todos` row as decoded by sqlx.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TodoRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
}

impl TryFrom<TodoRow> for Todo {
    type Error = RepositoryError;

    /// Fails if the stored priority is not one of the recognized values,
    /// which can only happen for rows written by other tools.
    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let priority = row
            .priority
            .parse::<Priority>()
            .map_err(|error| RepositoryError::SerializationError(error.to_string()))?;

        Ok(Self {
            id: TodoId::from_i64(row.id),
            title: row.title,
            description: row.description,
            completed: row.completed,
            priority,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: row.updated_at.map(Timestamp::from_datetime),
            due_date: row.due_date.map(Timestamp::from_datetime),
        })
    }
}

/// Converts a batch of rows, failing on the first undecodable one.
pub fn rows_into_todos(rows: Vec<TodoRow>) -> Result<Vec<Todo>, RepositoryError> {
    rows.into_iter().map(Todo::try_from).collect()
}

/// Converts the `(total, completed)` pair returned by the counting query.
pub fn counts_from_row((total, completed): (i64, i64)) -> (u64, u64) {
    (
        u64::try_from(total).unwrap_or(0),
        u64::try_from(completed).unwrap_or(0),
    )
}

// =============================================================================
// Tests
// =============================================================================
