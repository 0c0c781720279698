//! Event domain error types

use axum_helpers::AppError;
use thiserror::Error;

/// Result type for event operations
pub type Result<T> = std::result::Result<T, EventError>;

/// Event domain errors
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Invalid event ID format: {0}")]
    InvalidIdentifier(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Request body does not have the expected shape
    #[error("Invalid request body: {0}")]
    InvalidBody(serde_json::Error),

    #[error("Unauthorized access")]
    Unauthenticated,

    /// Carries the reason for the log; clients only see "Forbidden access"
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Convert to axum_helpers::AppError for HTTP responses
impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::InvalidIdentifier(_) => {
                AppError::InvalidId("Invalid event ID format".to_string())
            }
            EventError::Validation(errors) => AppError::ValidationError(errors),
            EventError::InvalidBody(e) => AppError::BadRequest(e.to_string()),
            EventError::Unauthenticated => AppError::Unauthorized("Unauthorized access".to_string()),
            EventError::Forbidden(reason) => {
                tracing::warn!(reason = %reason, "Write rejected for non-owner");
                AppError::Forbidden("Forbidden access".to_string())
            }
            EventError::NotFound(_) => AppError::NotFound("Event not found".to_string()),
            EventError::Database(e) => AppError::Database(e),
            EventError::Internal(message) => AppError::InternalServerError(message),
        }
    }
}

impl axum::response::IntoResponse for EventError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
