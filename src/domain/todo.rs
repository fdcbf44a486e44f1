//! Todo domain model.
//!
//! A [`Todo`] is the only entity of the service. Creation goes through
//! [`NewTodo`], mutation goes through [`TodoPatch`], and both are applied by
//! pure functions so that every storage backend shares the same semantics.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a todo.
///
/// Identifiers are allocated by the storage backend and never reused while
/// the record exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TodoId(i64);

impl TodoId {
    /// Creates a `TodoId` from a raw database identifier.
    #[must_use]
    pub const fn from_i64(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw database identifier.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A timestamp wrapper for `DateTime<Utc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Consumes the timestamp and returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn into_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Returns the current time as a `Timestamp`.
    ///
    /// **Note**: This reads the system clock. Storage backends call it when
    /// they stamp `created_at` and `updated_at`.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.to_rfc3339())
    }
}

// =============================================================================
// Priority
// =============================================================================

/// The priority level of a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Medium priority, assigned when the client does not choose one.
    #[default]
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// Returns the string stored in the `priority` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Returned when a string is not one of `low`, `medium` or `high`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown priority '{0}', expected one of: low, medium, high")]
pub struct UnknownPriority(pub String);

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(UnknownPriority(value.to_string())),
        }
    }
}

// =============================================================================
// Todo
// =============================================================================

/// A persisted todo record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    /// Server-assigned identifier.
    pub id: TodoId,
    /// Title, at most 200 characters.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Whether the todo is done.
    pub completed: bool,
    /// Priority level.
    pub priority: Priority,
    /// Creation time, never changes after insertion.
    pub created_at: Timestamp,
    /// Time of the most recent mutation, `None` until the first update.
    pub updated_at: Option<Timestamp>,
    /// Optional deadline.
    pub due_date: Option<Timestamp>,
}

impl Todo {
    /// Builds the stored record for a freshly inserted todo.
    #[must_use]
    pub fn from_new(id: TodoId, new_todo: NewTodo, created_at: Timestamp) -> Self {
        Self {
            id,
            title: new_todo.title,
            description: new_todo.description,
            completed: new_todo.completed,
            priority: new_todo.priority,
            created_at,
            updated_at: None,
            due_date: new_todo.due_date,
        }
    }

    /// Returns the todo with every field present in `patch` applied and
    /// `updated_at` set to `now`.
    ///
    /// Fields absent from the patch keep their current values. `id` and
    /// `created_at` are never touched.
    #[must_use]
    pub fn apply_patch(self, patch: TodoPatch, now: Timestamp) -> Self {
        Self {
            id: self.id,
            title: patch.title.unwrap_or(self.title),
            description: patch.description.unwrap_or(self.description),
            completed: patch.completed.unwrap_or(self.completed),
            priority: patch.priority.unwrap_or(self.priority),
            created_at: self.created_at,
            updated_at: Some(now),
            due_date: patch.due_date.unwrap_or(self.due_date),
        }
    }

    /// Returns `true` if the todo matches both optional equality filters.
    #[must_use]
    pub fn matches(&self, completed: Option<bool>, priority: Option<Priority>) -> bool {
        completed.is_none_or(|value| self.completed == value)
            && priority.is_none_or(|value| self.priority == value)
    }
}

// =============================================================================
// NewTodo
// =============================================================================

/// Validated data for a todo that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<Timestamp>,
}

impl NewTodo {
    /// Creates a new todo with the given title and default values for every
    /// other field (`completed = false`, `priority = medium`).
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Returns the todo with the given description.
    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    /// Returns the todo with the given completion flag.
    #[must_use]
    pub fn with_completed(self, completed: bool) -> Self {
        Self { completed, ..self }
    }

    /// Returns the todo with the given priority.
    #[must_use]
    pub fn with_priority(self, priority: Priority) -> Self {
        Self { priority, ..self }
    }

    /// Returns the todo with the given due date.
    #[must_use]
    pub fn with_due_date(self, due_date: Timestamp) -> Self {
        Self {
            due_date: Some(due_date),
            ..self
        }
    }
}

// =============================================================================
// TodoPatch
// =============================================================================

/// A field mask describing a partial update.
///
/// `None` means "leave the field alone". For nullable columns the inner
/// `Option` carries the new value, so `Some(None)` clears the field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<Timestamp>>,
}

impl TodoPatch {
    /// Creates a patch that only sets the completion flag.
    #[must_use]
    pub fn completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Returns `true` if the patch does not touch any field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Aggregate counts over every stored todo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TodoStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    /// Percentage of completed todos rounded to one decimal place.
    pub completion_rate: f64,
}

impl TodoStats {
    /// Derives the statistics from the two counts returned by storage.
    ///
    /// `completed` is clamped to `total` so `pending` never underflows.
    #[must_use]
    pub fn from_counts(total: u64, completed: u64) -> Self {
        let completed = completed.min(total);
        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate: completion_rate(total, completed),
        }
    }
}

/// Percentage of completed todos rounded to one decimal.
///
/// Rounding goes through decimal formatting, which rounds the exact binary
/// value: `0.15` is stored just below the midpoint and becomes `0.1`.
#[allow(clippy::cast_precision_loss)]
fn completion_rate(total: u64, completed: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percentage = completed as f64 / total as f64 * 100.0;
    format!("{percentage:.1}").parse().unwrap_or(percentage)
}

// =============================================================================
// Tests
// =============================================================================
