//! Application error types and HTTP error mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Connection error (database, cache or upstream services)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Cache backend error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authorization error
    #[error("Access denied: {0}")]
    Authorization(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Request validation error
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Conflicting resource state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Cryptographic failure (bad key material, tamper, malformed payload)
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Domain error carrying a machine-readable code and explicit status
    #[error("{message}")]
    Business {
        status: u16,
        code: String,
        message: String,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl AppError {
    /// Build a domain error with an explicit status and code.
    pub fn business(status: u16, code: &str, message: &str) -> Self {
        AppError::Business {
            status,
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(e: surrealdb::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::Cache(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Connection(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Axum response implementation for AppError
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = (&self).into();
        let body = Json(ErrorResponse::new(&code, &self.to_string()));
        (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        )
            .into_response()
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Optional details
    pub details: Option<String>,
    /// Request ID
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
            request_id: None,
        }
    }

    /// Attach details
    pub fn with_details(mut self, details: &str) -> Self {
        self.details = Some(details.to_string());
        self
    }

    /// Attach a request ID
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}

/// HTTP status and code mapping
impl From<&AppError> for (u16, String) {
    fn from(err: &AppError) -> (u16, String) {
        match err {
            AppError::NotFound(_) => (404, "NOT_FOUND".to_string()),
            AppError::Authentication(_) => (401, "UNAUTHORIZED".to_string()),
            AppError::Authorization(_) => (403, "FORBIDDEN".to_string()),
            AppError::Validation(_) => (422, "VALIDATION_FAILED".to_string()),
            AppError::Conflict(_) => (409, "CONFLICT".to_string()),
            AppError::Connection(_) => (503, "SERVICE_UNAVAILABLE".to_string()),
            AppError::Database(_) => (500, "INTERNAL_ERROR".to_string()),
            AppError::Cache(_) => (500, "CACHE_ERROR".to_string()),
            AppError::Crypto(_) => (500, "CRYPTO_ERROR".to_string()),
            AppError::Business { status, code, .. } => (*status, code.clone()),
            _ => (500, "INTERNAL_ERROR".to_string()),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_error_keeps_status_and_code() {
        let err = AppError::business(429, "private_key_rate_limited", "too many attempts");
        let (status, code) = (&err).into();
        assert_eq!(status, 429);
        assert_eq!(code, "private_key_rate_limited");
    }

    #[test]
    fn validation_maps_to_422() {
        let err = AppError::Validation("email is invalid".into());
        let (status, code) = (&err).into();
        assert_eq!(status, 422);
        assert_eq!(code, "VALIDATION_FAILED");
    }
}
