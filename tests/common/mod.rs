//! Common test helpers for integration tests.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, and not every file uses every
//! helper.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use pixel_todo_api::api::{AppState, build_router};
use pixel_todo_api::domain::NewTodo;
use pixel_todo_api::infrastructure::{
    InMemoryTodoRepository, SqliteTodoRepository, TodoRepository,
};

// =============================================================================
// Repository Helpers
// =============================================================================

/// Storage backends exercised by the contract tests.
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    InMemory,
    Sqlite,
}

/// Creates an empty repository for `backend`.
pub async fn create_repository(backend: Backend) -> Arc<dyn TodoRepository> {
    match backend {
        Backend::InMemory => Arc::new(InMemoryTodoRepository::new()),
        Backend::Sqlite => {
            let repository = SqliteTodoRepository::connect("sqlite::memory:", 1)
                .await
                .expect("in-memory sqlite should open");
            repository
                .ensure_schema()
                .await
                .expect("schema should be created");
            Arc::new(repository)
        }
    }
}

// =============================================================================
// AppState and Router Helpers
// =============================================================================

/// Creates a test `AppState` backed by the in-memory repository.
pub fn create_test_app_state() -> AppState {
    AppState::new(Arc::new(InMemoryTodoRepository::new()))
}

/// Builds the full router without a front-end bundle.
pub fn create_test_router(state: AppState) -> Router {
    build_router(state, None)
}

/// Builds the full router serving files from `static_dir`.
pub fn create_test_router_with_static(state: AppState, static_dir: &Path) -> Router {
    build_router(state, Some(static_dir))
}

/// Stores a todo directly through the repository.
pub async fn seed_todo(state: &AppState, new_todo: NewTodo) -> i64 {
    state
        .todo_repository
        .create(new_todo)
        .await
        .expect("seeding should succeed")
        .id
        .as_i64()
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Sends one request through `router` and returns the raw response.
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible")
}

/// Sends one request and decodes the body as JSON (`Value::Null` if empty).
pub async fn send_json(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = send(router, method, uri, body).await;
    let status = response.status();
    let bytes = read_body(response).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, json)
}

/// Collects the full response body.
pub async fn read_body(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect body")
        .to_bytes()
        .to_vec()
}

/// Returns the `Content-Type` header as a string.
pub fn content_type(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
