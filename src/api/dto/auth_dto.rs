//! Authentication DTOs
//!
//! Login credentials arrive encrypted with the shared public key; the
//! handler decrypts them before they reach the service.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user_dto::UserResponse;

/// Login request; both fields are base64 AES-GCM payloads
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Successful login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Change password for the authenticated user
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Start a password reset
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

/// Complete a password reset with the emailed token
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetConfirmRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Start email verification
#[derive(Debug, Deserialize, Validate)]
pub struct EmailVerificationRequest {
    #[validate(email)]
    pub email: String,
}

/// Complete email verification with the emailed token
#[derive(Debug, Deserialize, Validate)]
pub struct EmailVerificationConfirmRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub token: String,
}

/// Generic message response for auth flows
#[derive(Debug, Serialize)]
pub struct AuthMessageResponse {
    pub message: String,
}

impl AuthMessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
