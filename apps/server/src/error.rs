use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

/// Application errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("You have already committed to this proposal")]
    DuplicateCommitment,

    #[error("Proposal cannot be joined: {0}")]
    NotJoinable(String),

    #[error("Rate limit exceeded for {action_type}, try again in {retry_after}s")]
    RateLimitExceeded {
        action_type: String,
        retry_after: u64,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error type used in JSON bodies
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NotFound",
            AppError::Validation(_) => "ValidationError",
            AppError::Conflict(_) => "Conflict",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::DuplicateCommitment => "DuplicateCommitment",
            AppError::NotJoinable(_) => "NotJoinable",
            AppError::RateLimitExceeded { .. } => "RateLimitExceeded",
            AppError::Database(_) => "DatabaseError",
            AppError::Internal(_) => "InternalError",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::DuplicateCommitment => StatusCode::CONFLICT,
            AppError::NotJoinable(_) => StatusCode::CONFLICT,
            AppError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Persistence details stay in the logs
        let message = match self {
            AppError::Database(e) => {
                log::error!("Database error: {}", e);
                "A storage error occurred, please try again".to_string()
            }
            AppError::Internal(e) => {
                log::error!("Internal error: {}", e);
                "An unexpected error occurred".to_string()
            }
            _ => self.to_string(),
        };

        let (remaining, retry_after) = match self {
            AppError::RateLimitExceeded { retry_after, .. } => (Some(0), Some(*retry_after)),
            _ => (None, None),
        };

        let response = ErrorResponse {
            error: ErrorDetail {
                error_type: self.error_type().to_string(),
                message,
                remaining,
                retry_after,
            },
        };

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(retry_after) = retry_after {
            builder.insert_header(("Retry-After", retry_after.to_string()));
        }
        builder.json(response)
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
