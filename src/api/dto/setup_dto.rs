//! First-run setup DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user_dto::UserResponse;

/// Whether the initial super admin still needs to be created
#[derive(Debug, Serialize)]
pub struct SetupCheckResponse {
    pub setup_required: bool,
}

/// Create the initial super admin
#[derive(Debug, Deserialize, Validate)]
pub struct SetupCreateRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 8, max = 128))]
    pub password_confirmation: String,
}

/// Setup completion response
#[derive(Debug, Serialize)]
pub struct SetupCreateResponse {
    pub user: UserResponse,
    pub message: String,
}
