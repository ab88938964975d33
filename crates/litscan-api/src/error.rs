//! HTTP-facing error shape, shared by the producer and consumer binaries.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    Internal(litscan_core::Error),
}

impl From<litscan_core::Error> for ApiError {
    fn from(err: litscan_core::Error) -> Self {
        match err {
            litscan_core::Error::Validation(msg) => ApiError::Validation(msg),
            litscan_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };
        (status, Json(serde_json::json!({ "Error": message }))).into_response()
    }
}
