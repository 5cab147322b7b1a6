pub mod auth;
pub mod datasets;
pub mod health;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// Uniform error shape: status code plus `{ "error": "…" }`.
pub(crate) type ApiError = (StatusCode, Json<Value>);

pub(crate) fn bad_request(msg: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": msg.into() })))
}

pub(crate) fn unauthorized(msg: impl Into<String>) -> ApiError {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg.into() })))
}

pub(crate) fn not_found(msg: impl Into<String>) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "error": msg.into() })))
}

pub(crate) fn conflict(msg: impl Into<String>) -> ApiError {
    (StatusCode::CONFLICT, Json(json!({ "error": msg.into() })))
}

pub(crate) fn internal(msg: impl Into<String>) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": msg.into() })),
    )
}

pub(crate) fn bad_gateway(msg: impl Into<String>) -> ApiError {
    (StatusCode::BAD_GATEWAY, Json(json!({ "error": msg.into() })))
}
