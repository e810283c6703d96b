//! Mail test DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Send a test email through the configured transport
#[derive(Debug, Deserialize, Validate)]
pub struct SendTestEmailRequest {
    #[validate(email)]
    pub to: String,
    #[validate(length(min = 1, max = 255))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub body: String,
    pub html: Option<bool>,
}

/// Dispatch confirmation
#[derive(Debug, Serialize)]
pub struct SendTestEmailResponse {
    pub sent: bool,
    pub message: String,
}
