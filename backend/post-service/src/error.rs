/// Error types for Post Service
///
/// Every failure a handler can surface is an `AppError`. Errors are converted to
/// JSON responses of the form `{"error": "...", "status": 400}`.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for post-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input (text policy, oversized upload, bad form field)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Neither an uploaded file nor a URL was supplied
    #[error("File or URL is required")]
    MissingMedia,

    /// Uploaded file has a MIME type outside the allow-list
    #[error("Invalid file type '{0}'. Only JPEG, PNG, GIF, and WEBM are allowed")]
    InvalidMediaType(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Post not found")]
    PostNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("User already liked this post")]
    AlreadyLiked,

    #[error("User has not liked this post")]
    NotLiked,

    /// Identity provider failure (token exchange, profile fetch, bad state)
    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::MissingMedia
            | AppError::InvalidMediaType(_)
            | AppError::AlreadyLiked
            | AppError::NotLiked => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::PostNotFound | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::OAuth(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Don't leak internal details to API clients
        let error_msg = match self {
            AppError::Database(detail) | AppError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed with internal error");
                "Internal server error".to_string()
            }
            AppError::OAuth(detail) => {
                tracing::warn!(error = %detail, "identity provider error");
                "Identity provider error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_msg,
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::OAuth(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("Token error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
