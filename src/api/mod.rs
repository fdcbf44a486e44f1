//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod mutation;
pub mod query;
pub mod router;
pub mod static_files;

pub use dto::{CreateTodoRequest, ListTodosQuery, StatsResponse, TodoResponse, UpdateTodoRequest};
pub use error::{ApiError, ApiErrorResponse, FieldError, ValidationError};
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use handlers::{AppState, HealthResponse, create_todo, health_check};
pub use mutation::{delete_todo, toggle_todo, update_todo};
pub use query::{get_todo, list_todos, todo_stats};
pub use router::{api_routes, build_router};
