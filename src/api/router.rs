//! Route table and middleware stack.

use std::path::Path;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::routing::{get, patch};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{AppState, create_todo, health_check};
use super::mutation::{delete_todo, toggle_todo, update_todo};
use super::query::{get_todo, list_todos, todo_stats};
use super::static_files::{landing_page, static_service, utf8_content_type};

/// Builds the `/api` routes.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/stats/summary", get(todo_stats))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/todos/{id}/toggle", patch(toggle_todo))
        .with_state(state)
}

/// Builds the full application.
///
/// Paths outside `/api` are served from `static_dir`. When the directory is
/// not given or does not exist, `/` serves a built-in landing page and every
/// other path is a 404.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new().nest("/api", api_routes(state));

    let router = match static_dir.filter(|directory| directory.is_dir()) {
        Some(directory) => {
            tracing::info!(directory = %directory.display(), "Serving front-end bundle");
            router.fallback_service(static_service(directory))
        }
        None => {
            tracing::warn!("Front-end bundle not found, serving landing page");
            router.route("/", get(landing_page))
        }
    };

    router
        .layer(SetResponseHeaderLayer::overriding(
            CONTENT_TYPE,
            utf8_content_type,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
