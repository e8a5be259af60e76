use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error types, mirroring the core error kinds of the
/// follow/read/ingestion domain. The HTTP mapping is deliberately flat: every
/// user-facing kind becomes 400, and only genuine backend failure becomes 500.
#[derive(Debug)]
pub enum AppError {
    /// User, feed, or posting absent where required.
    NotFound(String),
    /// User does not follow the feed whose posting they attempt to read.
    NotAllowed(String),
    /// Username uniqueness violated on create.
    AlreadyExists(String),
    /// Field length constraints violated at construction (username/link).
    ValidationError(String),
    /// Any transport, HTTP, or parse failure from the Fetcher.
    FetchFailure(String),
    /// Database or other internal failure; details never reach the client.
    Internal(String),
}

/// Error response body sent to clients
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            AppError::NotFound(resource) => (
                StatusCode::BAD_REQUEST,
                "not_found",
                "Resource not found",
                Some(resource),
            ),
            AppError::NotAllowed(msg) => (
                StatusCode::BAD_REQUEST,
                "not_allowed",
                "Not allowed to perform this operation",
                Some(msg),
            ),
            AppError::AlreadyExists(resource) => (
                StatusCode::BAD_REQUEST,
                "already_exists",
                "Resource already exists",
                Some(resource),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Validation failed",
                Some(msg),
            ),
            AppError::FetchFailure(msg) => (
                StatusCode::BAD_REQUEST,
                "fetch_failure",
                "Feed could not be fetched",
                Some(msg),
            ),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred",
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: message.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return AppError::AlreadyExists("record already exists".to_string());
                }
                AppError::Internal(db_err.to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Result type alias for handlers and services.
pub type AppResult<T> = Result<T, AppError>;
