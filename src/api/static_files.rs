//! Front-end hosting.
//!
//! The bundle directory is served as the router fallback. Text responses
//! that carry no charset are tagged as UTF-8, which browsers otherwise
//! guess at for `.js` and `.css` files.

use std::path::Path;

use axum::body::Body;
use axum::http::{HeaderValue, Response, header::CONTENT_TYPE};
use axum::response::Html;
use tower_http::services::ServeDir;

/// Builds the service that serves files below `directory`.
///
/// Directory requests resolve to their `index.html`.
#[must_use]
pub fn static_service(directory: &Path) -> ServeDir {
    ServeDir::new(directory).append_index_html_on_directories(true)
}

/// Returns the `Content-Type` with `; charset=utf-8` appended, or `None`
/// when the header should stay as it is.
///
/// Only `text/*`, `application/javascript` and `application/json` are
/// tagged.
#[must_use]
pub fn utf8_content_type(response: &Response<Body>) -> Option<HeaderValue> {
    let content_type = response.headers().get(CONTENT_TYPE)?.to_str().ok()?;
    if content_type.to_ascii_lowercase().contains("charset") {
        return None;
    }

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let is_text = essence.starts_with("text/")
        || essence == "application/javascript"
        || essence == "application/json";
    if !is_text {
        return None;
    }

    HeaderValue::from_str(&format!("{content_type}; charset=utf-8")).ok()
}

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Pixel Todo</title>
    <style>
        body { background: #1a1a2e; color: #e0e0e0; font-family: monospace; text-align: center; padding-top: 10vh; }
        h1 { color: #f5c518; letter-spacing: 0.2em; }
        a { color: #7fdbff; }
    </style>
</head>
<body>
    <h1>PIXEL TODO</h1>
    <p>The API is running, but no front-end bundle was found.</p>
    <p>Try <a href="/api/health">/api/health</a> or <a href="/api/todos">/api/todos</a>.</p>
</body>
</html>
"#;

/// Built-in page served at `/` when no front-end bundle is available.
pub async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn response_with(content_type: Option<&'static str>) -> Response<Body> {
        let mut response = Response::new(Body::empty());
        if let Some(value) = content_type {
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(value));
        }
        response
    }

    #[rstest]
    #[case("text/html", Some("text/html; charset=utf-8"))]
    #[case("text/css", Some("text/css; charset=utf-8"))]
    #[case("application/javascript", Some("application/javascript; charset=utf-8"))]
    #[case("application/json", Some("application/json; charset=utf-8"))]
    #[case("text/html; charset=utf-8", None)]
    #[case("text/plain; Charset=ISO-8859-1", None)]
    #[case("image/png", None)]
    #[case("application/octet-stream", None)]
    fn test_utf8_content_type(#[case] content_type: &'static str, #[case] expected: Option<&str>) {
        let value = utf8_content_type(&response_with(Some(content_type)));
        assert_eq!(
            value.as_ref().and_then(|value| value.to_str().ok()),
            expected
        );
    }

    #[rstest]
    fn test_utf8_content_type_without_header() {
        assert!(utf8_content_type(&response_with(None)).is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_landing_page_mentions_health() {
        let Html(page) = landing_page().await;
        assert!(page.contains("/api/health"));
    }
}
