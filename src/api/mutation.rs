//! Handlers that modify or remove an existing todo.

use axum::{Json, extract::State, http::StatusCode};

use super::dto::{TodoResponse, UpdateTodoRequest, parse_todo_id};
use super::error::ApiErrorResponse;
use super::extract::{ApiJson, ApiPath};
use super::handlers::AppState;
use crate::domain::TodoPatch;

// =============================================================================
// PUT /todos/{id} - Partial Update
// =============================================================================

/// Applies a partial update.
///
/// Only keys present in the body are written. `description` and
/// `due_date` may be set to `null` to clear them. `updated_at` is stamped
/// even when the body is `{}`.
///
/// # Errors
///
/// - **404 Not Found**: No todo has this ID
/// - **422 Unprocessable Entity**: Invalid ID or body
/// - **500 Internal Server Error**: Repository operation failed
pub async fn update_todo(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<UpdateTodoRequest>,
) -> Result<Json<TodoResponse>, ApiErrorResponse> {
    let id = parse_todo_id(&id)?;
    let patch = request.into_patch()?;

    state
        .todo_repository
        .update(id, patch)
        .await?
        .map(|todo| Json(TodoResponse::from(todo)))
        .ok_or_else(|| ApiErrorResponse::not_found("Todo not found"))
}

// =============================================================================
// DELETE /todos/{id}
// =============================================================================

/// Deletes a todo.
///
/// # Response
///
/// - **204 No Content**: Todo deleted
///
/// # Errors
///
/// - **404 Not Found**: No todo has this ID
/// - **422 Unprocessable Entity**: The ID is not an integer
/// - **500 Internal Server Error**: Repository operation failed
pub async fn delete_todo(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, ApiErrorResponse> {
    let id = parse_todo_id(&id)?;

    if state.todo_repository.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiErrorResponse::not_found("Todo not found"))
    }
}

// =============================================================================
// PATCH /todos/{id}/toggle
// =============================================================================

/// Flips the completion flag through the regular update path, so
/// `updated_at` is stamped.
///
/// Two concurrent toggles of the same todo may both read the same flag;
/// the last write wins.
///
/// # Errors
///
/// - **404 Not Found**: No todo has this ID
/// - **422 Unprocessable Entity**: The ID is not an integer
/// - **500 Internal Server Error**: Repository operation failed
pub async fn toggle_todo(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<TodoResponse>, ApiErrorResponse> {
    let id = parse_todo_id(&id)?;
    let not_found = || ApiErrorResponse::not_found("Todo not found");

    let current = state
        .todo_repository
        .find_by_id(id)
        .await?
        .ok_or_else(not_found)?;

    state
        .todo_repository
        .update(id, TodoPatch::completion(!current.completed))
        .await?
        .map(|todo| Json(TodoResponse::from(todo)))
        .ok_or_else(not_found)
}

// =============================================================================
// Tests
// =============================================================================
