//! Error types for ytaudio-dl
//!
//! Domain failures are converted into HTTP responses exactly once, here:
//! invalid input maps to a client error, upstream unavailability to a bad
//! gateway, everything else to an internal error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use ytaudio_common::Error as DomainError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Failure surfaced from the orchestrator or engine boundary
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Domain(err) => {
                let (status, code) = match &err {
                    DomainError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                    DomainError::Unavailable(_) => (StatusCode::BAD_GATEWAY, "UNAVAILABLE"),
                    DomainError::Extraction(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "EXTRACTION_FAILED")
                    }
                    DomainError::MissingArtifact(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "MISSING_ARTIFACT")
                    }
                    DomainError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
                    DomainError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
                };
                (status, code, err.to_string())
            }
        };

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
