//! Error handling module for the tour catalog.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const DUPLICATE_KEY: &str = "DUPLICATE_KEY";
    pub const STORAGE_UNAVAILABLE: &str = "STORAGE_UNAVAILABLE";
    pub const UPLOAD_FAILURE: &str = "UPLOAD_FAILURE";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
}

/// Application error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Authentication required
    Unauthorized(String),
    /// Resource not found
    NotFound(String),
    /// Missing or invalid required field
    Validation(String),
    /// A package with this city already exists
    DuplicateKey(String),
    /// Storage layer or network unavailable
    StorageUnavailable(String),
    /// Image host rejected or failed the upload
    UploadFailure(String),
    /// Internal server error
    Internal(String),
    /// Bad request
    BadRequest(String),
    /// Request body over the configured limit
    PayloadTooLarge(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateKey(_) => StatusCode::CONFLICT,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UploadFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::DuplicateKey(_) => codes::DUPLICATE_KEY,
            AppError::StorageUnavailable(_) => codes::STORAGE_UNAVAILABLE,
            AppError::UploadFailure(_) => codes::UPLOAD_FAILURE,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => codes::PAYLOAD_TOO_LARGE,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::DuplicateKey(msg)
            | AppError::StorageUnavailable(msg)
            | AppError::UploadFailure(msg)
            | AppError::Internal(msg)
            | AppError::BadRequest(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
        }
    }

    /// Structured context for the envelope's `details` field.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::DuplicateKey(_) => Some(serde_json::json!({ "field": "city" })),
            _ => None,
        }
    }

    /// Rebuild an error from the code carried in a response envelope.
    ///
    /// Unknown codes map to `Internal` so a newer server never breaks an older client.
    pub fn from_code(code: &str, message: String) -> Self {
        match code {
            codes::UNAUTHORIZED => AppError::Unauthorized(message),
            codes::NOT_FOUND => AppError::NotFound(message),
            codes::VALIDATION_ERROR => AppError::Validation(message),
            codes::DUPLICATE_KEY => AppError::DuplicateKey(message),
            codes::STORAGE_UNAVAILABLE => AppError::StorageUnavailable(message),
            codes::UPLOAD_FAILURE => AppError::UploadFailure(message),
            codes::BAD_REQUEST => AppError::BadRequest(message),
            codes::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(message),
            _ => AppError::Internal(message),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                tracing::warn!("Unique constraint violated: {}", db_err.message());
                return AppError::DuplicateKey("A package for this city already exists".to_string());
            }
            if db_err.is_check_violation() {
                tracing::warn!("Check constraint violated: {}", db_err.message());
                return AppError::Validation(format!("Rejected by schema: {}", db_err.message()));
            }
        }
        tracing::error!("Database error: {:?}", err);
        AppError::StorageUnavailable(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
    pub revision_id: i64,
}

impl ErrorResponse {
    pub fn new(error: &AppError, revision_id: i64) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details: error.details(),
            },
            revision_id,
        }
    }
}

/// Wrapper type for errors that carry revision_id context.
pub struct AppErrorWithRevision {
    pub error: AppError,
    pub revision_id: i64,
}

impl IntoResponse for AppErrorWithRevision {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorResponse::new(&self.error, self.revision_id);
        (status, Json(body)).into_response()
    }
}
