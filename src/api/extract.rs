//! Extractors whose rejections render as [`ApiErrorResponse`].
//!
//! Axum's own `Json`, `Query` and `Path` reject with plain-text bodies and
//! mixed status codes; these wrappers route every rejection through the
//! shared error body instead.

use axum::extract::{FromRequest, FromRequestParts};

use super::error::ApiErrorResponse;

/// JSON request body.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiErrorResponse))]
pub struct ApiJson<T>(pub T);

/// Query string parameters.
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiErrorResponse))]
pub struct ApiQuery<T>(pub T);

/// Path parameters.
#[derive(Debug, Clone, Copy, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiErrorResponse))]
pub struct ApiPath<T>(pub T);
