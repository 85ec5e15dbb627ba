// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Every handler returns Result<_, CrmError>
/// Each variant maps to an HTTP status code and a stable error code string
#[derive(Error, Debug)]
pub enum CrmError {
    /// Missing record, or a record owned by another account
    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthenticated")]
    Unauthorized,

    #[error("These credentials do not match our records")]
    InvalidCredentials,

    #[error("Two factor authentication required")]
    TwoFactorRequired,

    #[error("Too many attempts, please slow down")]
    RateLimitExceeded,

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl CrmError {
    /// Stable machine-readable code sent in the error body
    pub fn code(&self) -> &'static str {
        match self {
            CrmError::NotFound(_) => "NOT_FOUND",
            CrmError::DatabaseError(_) => "DATABASE_ERROR",
            CrmError::InvalidInput(_) => "INVALID_INPUT",
            CrmError::ValidationError(_) => "VALIDATION_ERROR",
            CrmError::Unauthorized => "UNAUTHORIZED",
            CrmError::InvalidCredentials => "INVALID_CREDENTIALS",
            CrmError::TwoFactorRequired => "TWO_FACTOR_REQUIRED",
            CrmError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            CrmError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<validator::ValidationErrors> for CrmError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CrmError::ValidationError(errors.to_string())
    }
}

/// Convert CrmError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for CrmError {
    fn error_response(&self) -> HttpResponse {
        // Internal details stay in the logs
        let message = match self {
            CrmError::DatabaseError(_) | CrmError::InternalError(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": {
                "code": self.code(),
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            CrmError::NotFound(_) => StatusCode::NOT_FOUND,
            CrmError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CrmError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CrmError::ValidationError(_) => StatusCode::BAD_REQUEST,
            CrmError::Unauthorized => StatusCode::UNAUTHORIZED,
            CrmError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            CrmError::TwoFactorRequired => StatusCode::FORBIDDEN,
            CrmError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            CrmError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
