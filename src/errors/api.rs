use poem_openapi::{payload::Json, ApiResponse, Object};
use std::fmt;

use crate::errors::internal::DomainError;

/// Standardized error response body
#[derive(Object, Debug)]
pub struct ErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// API error types shared by all endpoints
#[derive(ApiResponse, Debug)]
pub enum ApiError {
    /// Missing, invalid or expired credentials
    #[oai(status = 401)]
    Unauthenticated(Json<ErrorResponse>),

    /// Caller lacks the required module permission or role
    #[oai(status = 403)]
    PermissionDenied(Json<ErrorResponse>),

    /// Malformed or incomplete request
    #[oai(status = 400)]
    Validation(Json<ErrorResponse>),

    /// Referenced record does not exist
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),

    /// A business invariant rejected the write
    #[oai(status = 409)]
    Conflict(Json<ErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    Internal(Json<ErrorResponse>),
}

impl ApiError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(Json(ErrorResponse {
            error: "unauthenticated".to_string(),
            message: message.into(),
            status_code: 401,
        }))
    }

    pub fn invalid_credentials() -> Self {
        Self::unauthenticated("Invalid username or password")
    }

    pub fn invalid_token() -> Self {
        Self::unauthenticated("Invalid or malformed JWT")
    }

    pub fn expired_token() -> Self {
        Self::unauthenticated("JWT has expired")
    }

    pub fn permission_denied() -> Self {
        ApiError::PermissionDenied(Json(ErrorResponse {
            error: "permission_denied".to_string(),
            message: "You do not have permission to perform this action".to_string(),
            status_code: 403,
        }))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(Json(ErrorResponse {
            error: "validation_failed".to_string(),
            message: message.into(),
            status_code: 400,
        }))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(Json(ErrorResponse {
            error: "not_found".to_string(),
            message: message.into(),
            status_code: 404,
        }))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(Json(ErrorResponse {
            error: "conflict".to_string(),
            message: message.into(),
            status_code: 409,
        }))
    }

    pub fn internal_server_error() -> Self {
        ApiError::Internal(Json(ErrorResponse {
            error: "internal_error".to_string(),
            message: "An internal error occurred".to_string(),
            status_code: 500,
        }))
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthenticated(json) => json.0.message.clone(),
            ApiError::PermissionDenied(json) => json.0.message.clone(),
            ApiError::Validation(json) => json.0.message.clone(),
            ApiError::NotFound(json) => json.0.message.clone(),
            ApiError::Conflict(json) => json.0.message.clone(),
            ApiError::Internal(json) => json.0.message.clone(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Database(db_err) => {
                tracing::error!("Database error: {}", db_err);
                Self::internal_server_error()
            }
            DomainError::NotFound { entity } => Self::not_found(format!("{} not found", entity)),
            DomainError::Validation(message) => Self::validation(message),
            DomainError::Conflict(message) => Self::conflict(message),
            DomainError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                Self::internal_server_error()
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
