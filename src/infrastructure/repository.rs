//! Repository trait for the todo entity.
//!
//! Every method returns a boxed `'static` future so the trait stays object
//! safe and handlers can hold it as `Arc<dyn TodoRepository>`.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{NewTodo, Priority, Todo, TodoId, TodoPatch, TodoStats};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The store is unreachable or rejected the statement.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored row could not be turned into a domain value.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::SerializationError(error.to_string())
            }
            _ => Self::DatabaseError(error.to_string()),
        }
    }
}

/// Future returned by every repository operation.
pub type RepositoryFuture<T> = BoxFuture<'static, Result<T, RepositoryError>>;

// =============================================================================
// Pagination
// =============================================================================

/// Offset pagination for list queries.
///
/// Range checks (`limit` in `1..=500`) happen at the HTTP boundary; the
/// repository accepts whatever it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Number of matching records to skip.
    pub skip: u64,
    /// Maximum number of records to return.
    pub limit: u32,
}

impl Pagination {
    /// Creates new pagination parameters.
    #[must_use]
    pub const fn new(skip: u64, limit: u32) -> Self {
        Self { skip, limit }
    }

    /// Returns the offset as a signed integer for SQL binding.
    #[must_use]
    pub fn offset_i64(&self) -> i64 {
        i64::try_from(self.skip).unwrap_or(i64::MAX)
    }

    /// Returns the limit as a signed integer for SQL binding.
    #[must_use]
    pub fn limit_i64(&self) -> i64 {
        i64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
        }
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Conjunctive equality filters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TodoFilter {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

impl TodoFilter {
    /// Returns `true` if the todo satisfies every filter that is set.
    #[must_use]
    pub fn matches(&self, todo: &Todo) -> bool {
        todo.matches(self.completed, self.priority)
    }
}

// =============================================================================
// Todo Repository
// =============================================================================

/// Repository trait for todo records.
pub trait TodoRepository: Send + Sync {
    /// Finds a todo by its ID.
    ///
    /// Returns `Ok(None)` if no such todo exists.
    fn find_by_id(&self, id: TodoId) -> RepositoryFuture<Option<Todo>>;

    /// Lists todos matching `filter`, newest first, paginated.
    ///
    /// Ties on `created_at` are broken by descending ID.
    fn list(&self, filter: TodoFilter, pagination: Pagination) -> RepositoryFuture<Vec<Todo>>;

    /// Stores a new todo, assigning its ID and `created_at`.
    fn create(&self, todo: NewTodo) -> RepositoryFuture<Todo>;

    /// Applies `patch` to an existing todo and stamps `updated_at`.
    ///
    /// Returns `Ok(None)` without side effects if the todo does not exist.
    fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryFuture<Option<Todo>>;

    /// Deletes a todo by its ID.
    ///
    /// Returns `Ok(true)` if the todo was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: TodoId) -> RepositoryFuture<bool>;

    /// Counts all todos and the completed ones.
    fn stats(&self) -> RepositoryFuture<TodoStats>;

    /// Releases the underlying store. Called once on shutdown.
    fn close(&self) -> BoxFuture<'static, ()> {
        Box::pin(async {})
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewTodo, Timestamp};
    use rstest::rstest;

    #[rstest]
    fn test_pagination_default() {
        let pagination = Pagination::default();
        assert_eq!(pagination.skip, 0);
        assert_eq!(pagination.limit, 100);
    }

    #[rstest]
    fn test_pagination_sql_bindings() {
        let pagination = Pagination::new(40, 20);
        assert_eq!(pagination.offset_i64(), 40);
        assert_eq!(pagination.limit_i64(), 20);

        let huge = Pagination::new(u64::MAX, 1);
        assert_eq!(huge.offset_i64(), i64::MAX);
    }

    #[rstest]
    fn test_filter_matches() {
        let todo = Todo::from_new(
            TodoId::from_i64(7),
            NewTodo::new("Ship it").with_priority(Priority::High),
            Timestamp::now(),
        );

        assert!(TodoFilter::default().matches(&todo));
        assert!(
            TodoFilter {
                completed: Some(false),
                priority: Some(Priority::High),
            }
            .matches(&todo)
        );
        assert!(
            !TodoFilter {
                completed: Some(true),
                priority: None,
            }
            .matches(&todo)
        );
    }

    #[rstest]
    fn test_repository_error_display() {
        let error = RepositoryError::DatabaseError("connection refused".to_string());
        assert_eq!(format!("{error}"), "Database error: connection refused");

        let error = RepositoryError::SerializationError("bad priority".to_string());
        assert_eq!(format!("{error}"), "Serialization error: bad priority");
    }

    #[rstest]
    fn test_repository_error_from_sqlx() {
        let error = RepositoryError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(error, RepositoryError::DatabaseError(_)));
    }
}
