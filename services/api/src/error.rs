//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use media::StorageError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Requested resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Request body larger than the configured upload limit
    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,

    /// Uniqueness or reference violation
    #[error("{0}")]
    Conflict(String),

    /// The storage backend could not persist the upload
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Upload exceeds the size limit".to_string(),
            ),
            ApiError::StorageUnavailable(e) => {
                error!("Storage backend failure: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Storage is unavailable, try again later".to_string(),
                )
            }
            ApiError::Database(e) => {
                error!("Database failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl ApiError {
    /// Classify a malformed upload body by the status axum assigns it
    pub fn from_upload(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::Validation(message)
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
