// Error handling types for the API

use axum::{
    extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

use super::validation::ValidationResult;

/// Failure kinds produced by the services behind the HTTP surface.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("security violation: {0}")]
    Security(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("invalid oauth state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("profile fetch failed: {0}")]
    ProfileFetch(String),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Authorization code exchange failures
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("authorization code not provided")]
    MissingCode,

    #[error("identity provider rejected the code: {0}")]
    Rejected(String),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    InternalServer(String),
    BadGateway(String),
    DatabaseError(sqlx::Error),
    ValidationError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::BadGateway(msg) => write!(f, "Bad Gateway: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalServer(_) | ApiError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let (error_message, code) = match self {
            ApiError::Unauthorized(msg) => (msg, "UNAUTHORIZED"),
            ApiError::BadRequest(msg) => (msg, "BAD_REQUEST"),
            ApiError::NotFound(msg) => (msg, "NOT_FOUND"),
            ApiError::InternalServer(msg) => (msg, "INTERNAL_SERVER_ERROR"),
            ApiError::BadGateway(msg) => (msg, "BAD_GATEWAY"),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                ("Database operation failed".to_string(), "DATABASE_ERROR")
            }
            ApiError::ValidationError(msg) => (msg, "VALIDATION_ERROR"),
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Maps core failures onto client-facing errors.
///
/// Token and configuration details are logged but never echoed back.
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ApiError::ValidationError(msg),
            ServiceError::NotFound(entity) => ApiError::NotFound(format!("{} not found", entity)),
            ServiceError::InvalidState(reason) => {
                warn!(reason = %reason, "Rejected OAuth callback with invalid state");
                ApiError::BadRequest("invalid oauth state".to_string())
            }
            ServiceError::InvalidToken(reason) => {
                warn!(reason = %reason, "Token validation failed");
                ApiError::Unauthorized("invalid or expired token".to_string())
            }
            ServiceError::Security(reason) => {
                warn!(reason = %reason, "Token rejected by algorithm check");
                ApiError::Unauthorized("invalid or expired token".to_string())
            }
            ServiceError::Configuration(reason) => {
                error!(reason = %reason, "Configuration error surfaced at request time");
                ApiError::InternalServer("internal server error".to_string())
            }
            ServiceError::Exchange(ExchangeError::MissingCode) => {
                ApiError::BadRequest("Authorization code not provided by Google".to_string())
            }
            ServiceError::Exchange(ExchangeError::Rejected(reason)) => {
                warn!(reason = %reason, "Google rejected the authorization code");
                ApiError::BadRequest("Failed to exchange code for token".to_string())
            }
            ServiceError::Exchange(ExchangeError::Unavailable(reason)) => {
                error!(reason = %reason, "Google token endpoint unavailable");
                ApiError::BadGateway("identity provider unavailable".to_string())
            }
            ServiceError::ProfileFetch(reason) => {
                error!(reason = %reason, "Failed to fetch Google profile");
                ApiError::BadGateway("Failed to get user info from Google".to_string())
            }
            ServiceError::Store(e) => ApiError::DatabaseError(e),
        }
    }
}

/// Unreadable request bodies get the usual error envelope
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(
            status = %rejection.status(),
            reason = %rejection.body_text(),
            "Rejected request body"
        );
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        ApiError::from(ServiceError::from(result))
    }
}

/// Collapses field errors into a single validation failure
impl From<ValidationResult> for ServiceError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ServiceError::Configuration(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ServiceError::Validation(error_messages.join(", "))
        }
    }
}
