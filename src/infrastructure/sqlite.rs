//! `SQLite` repository implementation.
//!
//! The default backend. Uses a `sqlx::SqlitePool`; each call acquires a
//! pooled connection for the duration of one statement. Every mutation is a
//! single statement, so it commits atomically on its own.

use std::str::FromStr;

use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};

use crate::domain::{NewTodo, Timestamp, Todo, TodoId, TodoPatch, TodoStats};
use crate::infrastructure::schema::{
    SQLITE_SCHEMA, TODO_COLUMNS, TodoRow, counts_from_row, rows_into_todos,
};
use crate::infrastructure::{
    Pagination, RepositoryError, RepositoryFuture, TodoFilter, TodoRepository,
};

/// Returns `true` for URLs that open a private in-memory database.
fn is_in_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// `SQLite` implementation of `TodoRepository`.
///
/// # Example
///
/// ```ignore
/// let repository = SqliteTodoRepository::connect("sqlite://pixel_todos.db", 5).await?;
/// repository.ensure_schema().await?;
/// let todo = repository.create(NewTodo::new("Buy milk")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    /// Creates a repository over an existing pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `url`, creating the database file if it is missing.
    ///
    /// In-memory URLs get a single connection that is never recycled, since
    /// each `SQLite` connection would otherwise see its own empty database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the URL is invalid or the
    /// database cannot be opened.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool_options = if is_in_memory_url(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        Ok(Self::new(pool))
    }

    /// Creates the `todos` table and its indexes if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if a DDL statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in SQLITE_SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl TodoRepository for SqliteTodoRepository {
    fn find_by_id(&self, id: TodoId) -> RepositoryFuture<Option<Todo>> {
        let pool = self.pool.clone();
        async move {
            let row: Option<TodoRow> =
                sqlx::query_as(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?"))
                    .bind(id.as_i64())
                    .fetch_optional(&pool)
                    .await?;

            row.map(Todo::try_from).transpose()
        }
        .boxed()
    }

    fn list(&self, filter: TodoFilter, pagination: Pagination) -> RepositoryFuture<Vec<Todo>> {
        let pool = self.pool.clone();
        async move {
            let mut builder =
                QueryBuilder::<Sqlite>::new(format!("SELECT {TODO_COLUMNS} FROM todos WHERE 1=1"));

            if let Some(completed) = filter.completed {
                builder.push(" AND completed = ").push_bind(completed);
            }
            if let Some(priority) = filter.priority {
                builder.push(" AND priority = ").push_bind(priority.as_str());
            }

            builder
                .push(" ORDER BY created_at DESC, id DESC LIMIT ")
                .push_bind(pagination.limit_i64())
                .push(" OFFSET ")
                .push_bind(pagination.offset_i64());

            let rows: Vec<TodoRow> = builder.build_query_as().fetch_all(&pool).await?;
            rows_into_todos(rows)
        }
        .boxed()
    }

    fn create(&self, todo: NewTodo) -> RepositoryFuture<Todo> {
        let pool = self.pool.clone();
        async move {
            let row: TodoRow = sqlx::query_as(&format!(
                "INSERT INTO todos (title, description, completed, priority, created_at, due_date) \
                 VALUES (?, ?, ?, ?, ?, ?) RETURNING {TODO_COLUMNS}"
            ))
            .bind(todo.title)
            .bind(todo.description)
            .bind(todo.completed)
            .bind(todo.priority.as_str())
            .bind(Timestamp::now().into_datetime())
            .bind(todo.due_date.map(Timestamp::into_datetime))
            .fetch_one(&pool)
            .await?;

            let created = Todo::try_from(row)?;
            tracing::debug!(id = %created.id, "Created todo");
            Ok(created)
        }
        .boxed()
    }

    fn update(&self, id: TodoId, patch: TodoPatch) -> RepositoryFuture<Option<Todo>> {
        let pool = self.pool.clone();
        async move {
            let mut builder = QueryBuilder::<Sqlite>::new("UPDATE todos SET updated_at = ");
            builder.push_bind(Timestamp::now().into_datetime());

            if let Some(title) = patch.title {
                builder.push(", title = ").push_bind(title);
            }
            if let Some(description) = patch.description {
                builder.push(", description = ").push_bind(description);
            }
            if let Some(completed) = patch.completed {
                builder.push(", completed = ").push_bind(completed);
            }
            if let Some(priority) = patch.priority {
                builder.push(", priority = ").push_bind(priority.as_str());
            }
            if let Some(due_date) = patch.due_date {
                builder
                    .push(", due_date = ")
                    .push_bind(due_date.map(Timestamp::into_datetime));
            }

            builder
                .push(" WHERE id = ")
                .push_bind(id.as_i64())
                .push(" RETURNING ")
                .push(TODO_COLUMNS);

            let row: Option<TodoRow> = builder.build_query_as().fetch_optional(&pool).await?;
            let updated = row.map(Todo::try_from).transpose()?;
            if updated.is_some() {
                tracing::debug!(%id, "Updated todo");
            }
            Ok(updated)
        }
        .boxed()
    }

    fn delete(&self, id: TodoId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query("DELETE FROM todos WHERE id = ?")
                .bind(id.as_i64())
                .execute(&pool)
                .await?;

            let deleted = result.rows_affected() > 0;
            if deleted {
                tracing::debug!(%id, "Deleted todo");
            }
            Ok(deleted)
        }
        .boxed()
    }

    fn stats(&self) -> RepositoryFuture<TodoStats> {
        let pool = self.pool.clone();
        async move {
            let row: (i64, i64) = sqlx::query_as(
                "SELECT COUNT(*), COALESCE(SUM(CASE WHEN completed THEN 1 ELSE 0 END), 0) \
                 FROM todos",
            )
            .fetch_one(&pool)
            .await?;

            let (total, completed) = counts_from_row(row);
            Ok(TodoStats::from_counts(total, completed))
        }
        .boxed()
    }

    fn close(&self) -> BoxFuture<'static, ()> {
        let pool = self.pool.clone();
        async move { pool.close().await }.boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
