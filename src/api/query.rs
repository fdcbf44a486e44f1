//! Read-only todo handlers.

use axum::{Json, extract::State};

use super::dto::{ListTodosQuery, StatsResponse, TodoResponse, parse_todo_id};
use super::error::ApiErrorResponse;
use super::extract::{ApiPath, ApiQuery};
use super::handlers::AppState;

// =============================================================================
// GET /todos - List Todos
// =============================================================================

/// Lists todos, newest first, with optional filtering.
///
/// # Query Parameters
///
/// - `skip`: Number of records to skip (default: 0)
/// - `limit`: Maximum number of records (default: 100, range: 1-500)
/// - `completed`: Optional filter by completion flag
/// - `priority`: Optional filter by priority; empty means no filter
///
/// # Response
///
/// - **200 OK**: Array of todos, possibly empty
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] in the following cases:
/// - **422 Unprocessable Entity**: A parameter is out of range or malformed
/// - **500 Internal Server Error**: Repository operation failed
pub async fn list_todos(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListTodosQuery>,
) -> Result<Json<Vec<TodoResponse>>, ApiErrorResponse> {
    let (filter, pagination) = query.into_criteria()?;

    let todos = state.todo_repository.list(filter, pagination).await?;

    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

// =============================================================================
// GET /todos/{id} - Get Todo
// =============================================================================

/// Returns a single todo.
///
/// # Errors
///
/// - **404 Not Found**: No todo has this ID
/// - **422 Unprocessable Entity**: The ID is not an integer
/// - **500 Internal Server Error**: Repository operation failed
pub async fn get_todo(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<TodoResponse>, ApiErrorResponse> {
    let id = parse_todo_id(&id)?;

    state
        .todo_repository
        .find_by_id(id)
        .await?
        .map(|todo| Json(TodoResponse::from(todo)))
        .ok_or_else(|| ApiErrorResponse::not_found("Todo not found"))
}

// =============================================================================
// GET /todos/stats/summary - Statistics
// =============================================================================

/// Returns aggregate counts over all todos.
///
/// # Errors
///
/// - **500 Internal Server Error**: Repository operation failed
pub async fn todo_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiErrorResponse> {
    let stats = state.todo_repository.stats().await?;
    Ok(Json(StatsResponse::from(stats)))
}

// =============================================================================
// Tests
// =============================================================================
