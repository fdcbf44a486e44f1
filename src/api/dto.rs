//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs are deliberately loose (strings and options) so that
//! every malformed field is reported by name in a `VALIDATION_ERROR` body
//! instead of failing JSON deserialization as a whole.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::ValidationError;
use crate::domain::{NewTodo, Priority, Timestamp, Todo, TodoId, TodoPatch, TodoStats};
use crate::infrastructure::{Pagination, TodoFilter};

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// Page size used when `limit` is not given.
pub const DEFAULT_LIMIT: u32 = 100;

/// Largest accepted `limit`.
pub const MAX_LIMIT: u32 = 500;

// =============================================================================
// Todo DTOs
// =============================================================================

/// Request DTO for creating a new todo.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodoRequest {
    /// Title of the todo (required).
    #[serde(default)]
    pub title: Option<String>,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Completion flag (defaults to `false`).
    #[serde(default)]
    pub completed: Option<bool>,
    /// Priority level (defaults to `medium`).
    #[serde(default)]
    pub priority: Option<String>,
    /// Optional deadline, see [`parse_due_date`] for accepted formats.
    #[serde(default)]
    pub due_date: Option<String>,
}

impl CreateTodoRequest {
    /// Validates the request and converts it into a [`NewTodo`].
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn into_new_todo(self) -> Result<NewTodo, ValidationError> {
        let mut errors = ValidationError::default();

        let title = match self.title {
            Some(title) => record(&mut errors, "title", validate_title(title)),
            None => {
                errors.push("title", "Title is required");
                None
            }
        };
        let priority = match self.priority {
            Some(priority) => record(&mut errors, "priority", parse_priority(&priority)),
            None => Some(Priority::default()),
        };
        let due_date = match self.due_date {
            Some(due_date) => record(&mut errors, "due_date", parse_due_date(&due_date)).map(Some),
            None => Some(None),
        };

        let (Some(title), Some(priority), Some(due_date)) = (title, priority, due_date) else {
            return Err(errors);
        };

        errors.into_result(NewTodo {
            title,
            description: self.description,
            completed: self.completed.unwrap_or(false),
            priority,
            due_date,
        })
    }
}

/// Request DTO for a partial update.
///
/// Each field is `None` when the key is absent from the body and
/// `Some(None)` when it is present with a `null` value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoRequest {
    /// New title.
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    /// New description; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    /// New completion flag.
    #[serde(default, deserialize_with = "present")]
    pub completed: Option<Option<bool>>,
    /// New priority.
    #[serde(default, deserialize_with = "present")]
    pub priority: Option<Option<String>>,
    /// New deadline; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<String>>,
}

/// Marks a key as present, keeping an explicit `null` as `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateTodoRequest {
    /// Validates the request and converts it into a [`TodoPatch`].
    ///
    /// `title`, `completed` and `priority` are not nullable, so an explicit
    /// `null` for them is a validation error.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn into_patch(self) -> Result<TodoPatch, ValidationError> {
        let mut errors = ValidationError::default();

        let title = match self.title {
            None => None,
            Some(None) => reject_null(&mut errors, "title"),
            Some(Some(title)) => record(&mut errors, "title", validate_title(title)),
        };
        let completed = match self.completed {
            None => None,
            Some(None) => reject_null(&mut errors, "completed"),
            Some(Some(completed)) => Some(completed),
        };
        let priority = match self.priority {
            None => None,
            Some(None) => reject_null(&mut errors, "priority"),
            Some(Some(priority)) => record(&mut errors, "priority", parse_priority(&priority)),
        };
        let due_date = match self.due_date {
            None => None,
            Some(None) => Some(None),
            Some(Some(due_date)) => {
                record(&mut errors, "due_date", parse_due_date(&due_date)).map(Some)
            }
        };

        errors.into_result(TodoPatch {
            title,
            description: self.description,
            completed,
            priority,
            due_date,
        })
    }
}

fn reject_null<T>(errors: &mut ValidationError, field: &str) -> Option<T> {
    errors.push(field, "must not be null");
    None
}

fn record<T>(errors: &mut ValidationError, field: &str, result: Result<T, String>) -> Option<T> {
    result.map_err(|message| errors.push(field, message)).ok()
}

/// Response DTO for a todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id.as_i64(),
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            priority: todo.priority,
            created_at: todo.created_at.into_datetime(),
            updated_at: todo.updated_at.map(Timestamp::into_datetime),
            due_date: todo.due_date.map(Timestamp::into_datetime),
        }
    }
}

/// Response DTO for `GET /todos/stats/summary`.
///
/// An empty store reports `completion_rate` as the integer `0`; any other
/// rate is written as a float.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StatsResponse {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub completion_rate: f64,
}

impl Serialize for StatsResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("StatsResponse", 4)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("completed", &self.completed)?;
        state.serialize_field("pending", &self.pending)?;
        if self.total == 0 {
            state.serialize_field("completion_rate", &0u64)?;
        } else {
            state.serialize_field("completion_rate", &self.completion_rate)?;
        }
        state.end()
    }
}

impl From<TodoStats> for StatsResponse {
    fn from(stats: TodoStats) -> Self {
        Self {
            total: stats.total,
            completed: stats.completed,
            pending: stats.pending,
            completion_rate: stats.completion_rate,
        }
    }
}

// =============================================================================
// Query DTOs
// =============================================================================

/// Query parameters for `GET /todos`.
///
/// Kept as raw strings so that range and format errors are reported per
/// parameter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTodosQuery {
    pub skip: Option<String>,
    pub limit: Option<String>,
    pub completed: Option<String>,
    pub priority: Option<String>,
}

impl ListTodosQuery {
    /// Validates the parameters and converts them into repository criteria.
    ///
    /// An empty `priority` means "no filter".
    ///
    /// # Errors
    ///
    /// Returns every failing parameter at once.
    pub fn into_criteria(self) -> Result<(TodoFilter, Pagination), ValidationError> {
        let mut errors = ValidationError::default();

        let skip = match self.skip.as_deref().map(str::trim) {
            None | Some("") => Some(0),
            Some(raw) => record(
                &mut errors,
                "skip",
                raw.parse::<u64>()
                    .map_err(|_| "must be a non-negative integer".to_string()),
            ),
        };
        let limit = match self.limit.as_deref().map(str::trim) {
            None | Some("") => Some(DEFAULT_LIMIT),
            Some(raw) => record(&mut errors, "limit", parse_limit(raw)),
        };
        let completed = match self.completed.as_deref().map(str::trim) {
            None | Some("") => Some(None),
            Some(raw) => record(
                &mut errors,
                "completed",
                parse_bool(raw).ok_or_else(|| "must be a boolean".to_string()),
            )
            .map(Some),
        };
        let priority = match self.priority.as_deref().map(str::trim) {
            None | Some("") => Some(None),
            Some(raw) => record(&mut errors, "priority", parse_priority(raw)).map(Some),
        };

        let (Some(skip), Some(limit), Some(completed), Some(priority)) =
            (skip, limit, completed, priority)
        else {
            return Err(errors);
        };

        errors.into_result((
            TodoFilter {
                completed,
                priority,
            },
            Pagination::new(skip, limit),
        ))
    }
}

// =============================================================================
// Field Parsers
// =============================================================================

/// Validates a todo title.
///
/// # Errors
///
/// Returns a message if the title is blank or longer than
/// [`TITLE_MAX_CHARS`] characters.
pub fn validate_title(title: String) -> Result<String, String> {
    if title.trim().is_empty() {
        return Err("Title must not be empty".to_string());
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        ));
    }
    Ok(title)
}

/// Parses a priority name.
///
/// # Errors
///
/// Returns a message listing the accepted values.
pub fn parse_priority(value: &str) -> Result<Priority, String> {
    value.parse::<Priority>().map_err(|error| error.to_string())
}

/// Parses a path identifier.
///
/// # Errors
///
/// Returns a `ValidationError` on the `id` field if `value` is not an integer.
pub fn parse_todo_id(value: &str) -> Result<TodoId, ValidationError> {
    value
        .trim()
        .parse::<i64>()
        .map(TodoId::from_i64)
        .map_err(|_| ValidationError::single("id", "must be an integer"))
}

fn parse_limit(value: &str) -> Result<u32, String> {
    let message = || format!("must be an integer between 1 and {MAX_LIMIT}");
    let limit = value.parse::<i64>().map_err(|_| message())?;
    u32::try_from(limit)
        .ok()
        .filter(|limit| (1..=MAX_LIMIT).contains(limit))
        .ok_or_else(message)
}

/// Parses a boolean query value (`true`/`false`, `1`/`0`, `yes`/`no`,
/// `on`/`off`, case-insensitive).
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Naive date-time layouts, interpreted as UTC. `%.f` also matches an
/// absent fraction.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses a due date.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`, `2024-05-01T10:00:00+02:00`),
/// a naive date-time in UTC (`2024-05-01T10:00`, `2024-05-01 10:00:00.5`)
/// and a bare date (`2024-05-01`, midnight UTC).
///
/// # Errors
///
/// Returns a message if `value` matches none of these forms.
pub fn parse_due_date(value: &str) -> Result<Timestamp, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("Due date must not be empty".to_string());
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Timestamp::from_datetime(datetime.with_timezone(&Utc)));
    }

    let normalized = trimmed.replacen(' ', "T", 1);
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(Timestamp::from_datetime(naive.and_utc()));
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Timestamp::from_datetime(naive.and_utc()))
        .ok_or_else(|| format!("'{trimmed}' is not a valid date or date-time"))
}

// =============================================================================
// Tests
// =============================================================================
