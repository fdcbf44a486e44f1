//! `PostgreSQL` repository implementation.
//!
//! Selected with `STORAGE_MODE=postgres`. Uses a `sqlx::PgPool` and native
//! `BIGSERIAL` / `TIMESTAMPTZ` columns.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE todos (
//!     id BIGSERIAL PRIMARY KEY,
//!     title VARCHAR(200) NOT NULL,
//!     description TEXT,
//!     completed BOOLEAN NOT NULL DEFAULT FALSE,
//!     priority VARCHAR(10) NOT NULL DEFAULT 'medium',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ,
//!     due_date TIMESTAMPTZ
//! );
//! ```

use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};

use crate::domain::{NewTodo, Timestamp, Todo, TodoId, TodoPatch, TodoStats};
use crate::infrastructure::schema::{
    POSTGRES_SCHEMA, TODO_COLUMNS, TodoRow, counts_from_row, rows_into_todos,
};
use crate::infrastructure::{
    Pagination, RepositoryError, RepositoryFuture, TodoFilter, TodoRepository,
};

/// `PostgreSQL` implementation of `TodoRepository`.
///
/// # Example
///
/// ```ignore
/// let repository = PostgresTodoRepository::connect("postgres://localhost/todos", 5).await?;
/// repository.ensure_schema().await?;
/// let todo = repository.create(NewTodo::new("Buy milk")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    /// Creates a new `PostgreSQL` todo repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool for `url`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the server is unreachable.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Creates the `todos` table and its indexes if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if a DDL statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in POSTGRES_SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl TodoRepository for PostgresTodoRepository {
    fn find_by_id(&self, id: TodoId) -> RepositoryFuture<Option<Todo>> {
        let pool = self.pool.clone();
        async move {
            let row: Option<TodoRow> =
                sqlx::query_as(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"))
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
            // Placeholders ($1, $2, ...) are numbered by the builder.
            let mut builder = QueryBuilder::<Postgres>::new(format!(
                "SELECT {TODO_COLUMNS} FROM todos WHERE 1=1"
            ));

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
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TODO_COLUMNS}"
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
            let mut builder = QueryBuilder::<Postgres>::new("UPDATE todos SET updated_at = ");
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
            let result = sqlx::query("DELETE FROM todos WHERE id = $1")
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
                "SELECT COUNT(*), COALESCE(SUM(CASE WHEN completed THEN 1 ELSE 0 END), 0)::BIGINT \
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
