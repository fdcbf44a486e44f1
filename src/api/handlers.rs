//! Shared application state and the create and health handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use super::dto::{CreateTodoRequest, TodoResponse};
use super::error::ApiErrorResponse;
use super::extract::ApiJson;
use crate::infrastructure::{Repositories, TodoRepository};

// =============================================================================
// Application State
// =============================================================================

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Todo repository for persistence.
    pub todo_repository: Arc<dyn TodoRepository>,
}

impl AppState {
    /// Creates a new `AppState` around an existing repository.
    #[must_use]
    pub fn new(todo_repository: Arc<dyn TodoRepository>) -> Self {
        Self { todo_repository }
    }

    /// Creates a new `AppState` from initialized repositories.
    ///
    /// This constructor takes ownership of the `Repositories` struct returned
    /// by `RepositoryFactory::create()`.
    #[must_use]
    pub fn from_repositories(repositories: Repositories) -> Self {
        Self::new(repositories.todo_repository)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("todo_repository", &"Arc<dyn TodoRepository>")
            .finish()
    }
}

// =============================================================================
// POST /todos Handler
// =============================================================================

/// Creates a new todo.
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Todo title",
///   "description": "Optional description",
///   "completed": false,
///   "priority": "low|medium|high",
///   "due_date": "2024-05-01T10:00"
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: Todo created successfully
/// - **422 Unprocessable Entity**: Validation error
/// - **500 Internal Server Error**: Database error
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] if the body is invalid or the repository
/// fails.
pub async fn create_todo(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiErrorResponse> {
    let new_todo = request.into_new_todo()?;
    let todo = state.todo_repository.create(new_todo).await?;
    Ok((StatusCode::CREATED, Json(TodoResponse::from(todo))))
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Human-readable status line.
    pub message: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Liveness endpoint.
///
/// Does not touch storage, so it reports healthy as long as the process
/// serves requests.
///
/// ```json
/// {
///   "status": "healthy",
///   "message": "Pixel Todo API is running",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Pixel Todo API is running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, TodoId};
    use crate::infrastructure::InMemoryTodoRepository;
    use rstest::{fixture, rstest};

    #[fixture]
    fn state() -> AppState {
        AppState::new(Arc::new(InMemoryTodoRepository::new()))
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_todo_returns_created(state: AppState) {
        let request = CreateTodoRequest {
            title: Some("Buy milk".to_string()),
            priority: Some("high".to_string()),
            ..CreateTodoRequest::default()
        };

        let (status, Json(body)) = create_todo(State(state.clone()), ApiJson(request))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.title, "Buy milk");
        assert_eq!(body.priority, Priority::High);
        assert!(body.updated_at.is_none());

        let stored = state
            .todo_repository
            .find_by_id(TodoId::from_i64(body.id))
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn test_create_todo_validation_error_stores_nothing(state: AppState) {
        let request = CreateTodoRequest {
            title: Some("x".repeat(201)),
            ..CreateTodoRequest::default()
        };

        let error = create_todo(State(state.clone()), ApiJson(request))
            .await
            .unwrap_err();

        assert_eq!(error.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(state.todo_repository.stats().await.unwrap().total, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_health_check() {
        let Json(body) = health_check().await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.message, "Pixel Todo API is running");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
