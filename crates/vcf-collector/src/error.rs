//! Error types for the collector API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contact_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Contact already exists: {0}")]
    DuplicatePhone(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::DuplicatePhone(_) => (StatusCode::CONFLICT, "DUPLICATE_PHONE"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::StorageUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE")
            }
            ApiError::RateLimitExceeded => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(msg) => ApiError::Validation(msg),
            StoreError::DuplicatePhone(phone) => ApiError::DuplicatePhone(phone),
            StoreError::Unavailable(msg) => ApiError::StorageUnavailable(msg),
        }
    }
}
