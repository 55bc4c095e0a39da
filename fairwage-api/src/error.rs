//! Error types for fairwage-api

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Benchmark store cannot answer (503)
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// fairwage-common error
    #[error("Common error: {0}")]
    Common(#[from] fairwage_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use fairwage_common::Error as CommonError;

        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(CommonError::InvalidInput(msg)) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Common(CommonError::BenchmarkUnavailable(msg) | CommonError::BenchmarkTimeout(msg)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", msg)
            }
            ApiError::Common(ref err) => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR", err.to_string()),
        };

        if status.is_server_error() {
            error!("{} {}: {}", status.as_u16(), error_code, message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
