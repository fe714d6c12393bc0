//! Error handling module for the Diploma Pro backend.
//!
//! Every failure a handler can report is an [`AppError`]. Handlers wrap it in
//! [`AppErrorWithRevision`] so the error envelope carries the store revision
//! the client last saw.

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
    pub const SUBMIT_IN_PROGRESS: &str = "SUBMIT_IN_PROGRESS";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Admin key missing or wrong
    Unauthorized(String),
    /// Unknown department or document
    NotFound(String),
    /// A form or request field failed validation; the message is shown as is
    Validation(String),
    /// The same admin form is already being submitted
    Conflict(String),
    /// SQLite failure
    Database(String),
    /// Anything else, including stored documents that no longer parse
    Internal(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, &str) {
        match self {
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, codes::UNAUTHORIZED, msg.as_str())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, codes::NOT_FOUND, msg.as_str()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, codes::VALIDATION_ERROR, msg.as_str())
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, codes::SUBMIT_IN_PROGRESS, msg.as_str())
            }
            AppError::Database(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, codes::DATABASE_ERROR, msg.as_str())
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL_ERROR, msg.as_str())
            }
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.parts().0
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        self.parts().1
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        self.parts().2.to_string()
    }

    /// Attach the revision the response should report.
    pub fn at_revision(self, revision_id: i64) -> AppErrorWithRevision {
        AppErrorWithRevision {
            error: self,
            revision_id,
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
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

/// Request bodies are decoded by axum extractors, so a JSON error here comes
/// from a stored document.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("Stored document is not valid JSON: {:?}", err);
        AppError::Internal(format!("Stored document is not valid JSON: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
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
