//! End-to-end tests through the full router.
//!
//! Requests go through `tower::ServiceExt::oneshot`, so routing, extractor
//! rejections, status codes and middleware are all exercised.

mod common;

use axum::http::{Method, StatusCode, header};
use rstest::rstest;
use serde_json::{Value, json};

use common::{
    content_type, create_test_app_state, create_test_router, seed_todo, send, send_json,
};
use pixel_todo_api::domain::{NewTodo, Priority};

fn error_fields(body: &Value) -> Vec<String> {
    body["details"]
        .as_array()
        .map(|details| {
            details
                .iter()
                .filter_map(|detail| detail["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// Full Lifecycle
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_create_toggle_get_delete_scenario() {
    let router = create_test_router(create_test_app_state());

    let (status, created) = send_json(
        &router,
        Method::POST,
        "/api/todos",
        Some(json!({"title": "Water plants", "priority": "high"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Water plants");
    assert_eq!(created["priority"], "high");
    assert_eq!(created["completed"], false);
    assert!(created["updated_at"].is_null());
    let id = created["id"].as_i64().unwrap();

    let (status, toggled) =
        send_json(&router, Method::PATCH, &format!("/api/todos/{id}/toggle"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["completed"], true);
    assert!(toggled["updated_at"].is_string());

    let (status, fetched) = send_json(&router, Method::GET, &format!("/api/todos/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, toggled);

    let response = send(&router, Method::DELETE, &format!("/api/todos/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(common::read_body(response).await.is_empty());

    let (status, missing) = send_json(&router, Method::GET, &format!("/api/todos/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["code"], "NOT_FOUND");
}

// =============================================================================
// POST /api/todos
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_create_accepts_frontend_due_date() {
    let router = create_test_router(create_test_app_state());

    let (status, created) = send_json(
        &router,
        Method::POST,
        "/api/todos",
        Some(json!({"title": "Dentist", "due_date": "2024-05-01T10:30"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["due_date"], "2024-05-01T10:30:00Z");
    assert_eq!(created["priority"], "medium");
}

#[rstest]
#[case::missing_title(json!({"description": "no title"}), "title")]
#[case::long_title(json!({"title": "x".repeat(201)}), "title")]
#[case::unknown_priority(json!({"title": "Ok", "priority": "urgent"}), "priority")]
#[case::bad_due_date(json!({"title": "Ok", "due_date": "someday"}), "due_date")]
#[case::wrong_type(json!({"title": 42}), "body")]
#[tokio::test]
async fn test_create_validation_errors(#[case] body: Value, #[case] field: &str) {
    let state = create_test_app_state();
    let router = create_test_router(state.clone());

    let (status, error) = send_json(&router, Method::POST, "/api/todos", Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert!(error_fields(&error).contains(&field.to_string()));
    assert_eq!(state.todo_repository.stats().await.unwrap().total, 0);
}

#[rstest]
#[tokio::test]
async fn test_create_malformed_json_is_validation_error() {
    let router = create_test_router(create_test_app_state());
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/todos")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"title\": "))
        .unwrap();

    let response = tower::ServiceExt::oneshot(router, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[rstest]
#[tokio::test]
async fn test_create_oversized_body_is_payload_too_large() {
    let state = create_test_app_state();
    let router = create_test_router(state.clone());
    let title = "x".repeat(3 * 1024 * 1024);

    let response = send(&router, Method::POST, "/api/todos", Some(json!({"title": title}))).await;
    let status = response.status();
    let error: Value = serde_json::from_slice(&common::read_body(response).await).unwrap();

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error["code"], "INVALID_BODY");
    assert_eq!(state.todo_repository.stats().await.unwrap().total, 0);
}

// =============================================================================
// GET /api/todos
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_list_filters_and_orders() {
    let state = create_test_app_state();
    seed_todo(&state, NewTodo::new("Open high").with_priority(Priority::High)).await;
    let done_high = seed_todo(
        &state,
        NewTodo::new("Done high")
            .with_priority(Priority::High)
            .with_completed(true),
    )
    .await;
    let done_low = seed_todo(&state, NewTodo::new("Done low").with_completed(true)).await;
    let router = create_test_router(state);

    let (status, all) = send_json(&router, Method::GET, "/api/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|todo| todo["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Done low", "Done high", "Open high"]);

    let (_, completed) = send_json(&router, Method::GET, "/api/todos?completed=true", None).await;
    let ids: Vec<i64> = completed
        .as_array()
        .unwrap()
        .iter()
        .map(|todo| todo["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![done_low, done_high]);

    let (_, both) = send_json(
        &router,
        Method::GET,
        "/api/todos?completed=true&priority=high",
        None,
    )
    .await;
    assert_eq!(both.as_array().unwrap().len(), 1);
    assert_eq!(both[0]["id"], done_high);

    let (status, unfiltered) = send_json(&router, Method::GET, "/api/todos?priority=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unfiltered.as_array().unwrap().len(), 3);
}

#[rstest]
#[case("/api/todos?limit=0", "limit")]
#[case("/api/todos?limit=501", "limit")]
#[case("/api/todos?skip=-1", "skip")]
#[case("/api/todos?completed=perhaps", "completed")]
#[case("/api/todos?priority=urgent", "priority")]
#[tokio::test]
async fn test_list_rejects_bad_parameters(#[case] uri: &str, #[case] field: &str) {
    let router = create_test_router(create_test_app_state());

    let (status, error) = send_json(&router, Method::GET, uri, None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&error), vec![field.to_string()]);
}

#[rstest]
#[case("/api/todos?limit=1", 1)]
#[case("/api/todos?limit=500", 3)]
#[case("/api/todos?skip=2", 1)]
#[case("/api/todos?skip=5", 0)]
#[tokio::test]
async fn test_list_pagination_boundaries(#[case] uri: &str, #[case] expected: usize) {
    let state = create_test_app_state();
    for title in ["A", "B", "C"] {
        seed_todo(&state, NewTodo::new(title)).await;
    }
    let router = create_test_router(state);

    let (status, todos) = send_json(&router, Method::GET, uri, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(todos.as_array().unwrap().len(), expected);
}

// =============================================================================
// PUT /api/todos/{id}
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_update_partial() {
    let state = create_test_app_state();
    let id = seed_todo(
        &state,
        NewTodo::new("Report")
            .with_description("Draft")
            .with_priority(Priority::High),
    )
    .await;
    let router = create_test_router(state);
    let (_, before) = send_json(&router, Method::GET, &format!("/api/todos/{id}"), None).await;

    let (status, after) = send_json(
        &router,
        Method::PUT,
        &format!("/api/todos/{id}"),
        Some(json!({"priority": "low"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["priority"], "low");
    assert!(after["updated_at"].is_string());
    for key in ["id", "title", "description", "completed", "created_at", "due_date"] {
        assert_eq!(after[key], before[key], "{key} should be unchanged");
    }
}

#[rstest]
#[tokio::test]
async fn test_update_null_semantics() {
    let state = create_test_app_state();
    let id = seed_todo(&state, NewTodo::new("Report").with_description("Draft")).await;
    let router = create_test_router(state);
    let uri = format!("/api/todos/{id}");

    let (status, cleared) =
        send_json(&router, Method::PUT, &uri, Some(json!({"description": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared["description"].is_null());

    let (status, error) = send_json(&router, Method::PUT, &uri, Some(json!({"title": null}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&error), vec!["title".to_string()]);
}

#[rstest]
#[case(Method::GET)]
#[case(Method::PUT)]
#[case(Method::DELETE)]
#[tokio::test]
async fn test_non_integer_id_is_validation_error(#[case] method: Method) {
    let router = create_test_router(create_test_app_state());
    let body = (method == Method::PUT).then(|| json!({}));

    let (status, error) = send_json(&router, method, "/api/todos/abc", body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_fields(&error), vec!["id".to_string()]);
}

#[rstest]
#[case(Method::GET, "/api/todos/77")]
#[case(Method::PUT, "/api/todos/77")]
#[case(Method::DELETE, "/api/todos/77")]
#[case(Method::PATCH, "/api/todos/77/toggle")]
#[tokio::test]
async fn test_missing_todo_is_not_found(#[case] method: Method, #[case] uri: &str) {
    let router = create_test_router(create_test_app_state());
    let body = (method == Method::PUT).then(|| json!({"title": "New"}));

    let (status, error) = send_json(&router, method, uri, body).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "NOT_FOUND");
}

// =============================================================================
// Stats, Health, CORS
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_stats_summary() {
    let state = create_test_app_state();
    let router = create_test_router(state.clone());

    let (status, empty) = send_json(&router, Method::GET, "/api/todos/stats/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        empty,
        json!({"total": 0, "completed": 0, "pending": 0, "completion_rate": 0})
    );

    seed_todo(&state, NewTodo::new("Done").with_completed(true)).await;
    seed_todo(&state, NewTodo::new("Open")).await;
    seed_todo(&state, NewTodo::new("Open too")).await;

    let (_, stats) = send_json(&router, Method::GET, "/api/todos/stats/summary", None).await;
    assert_eq!(
        stats,
        json!({"total": 3, "completed": 1, "pending": 2, "completion_rate": 33.3})
    );
}

#[rstest]
#[tokio::test]
async fn test_health() {
    let router = create_test_router(create_test_app_state());

    let response = send(&router, Method::GET, "/api/health", None).await;
    assert_eq!(
        content_type(&response).as_deref(),
        Some("application/json; charset=utf-8")
    );

    let body: Value = serde_json::from_slice(&common::read_body(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["message"], "Pixel Todo API is running");
}

#[rstest]
#[tokio::test]
async fn test_cors_allows_any_origin() {
    let router = create_test_router(create_test_app_state());
    let request = axum::http::Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/todos")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(router, request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
}
