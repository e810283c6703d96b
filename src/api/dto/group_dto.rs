//! Group DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::group::Group;
use crate::services::group::GroupDetail;

/// Create group request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub description: Option<String>,
}

/// Update group request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateGroupRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

/// Listing filter
#[derive(Debug, Default, Deserialize)]
pub struct ListGroupsParams {
    pub active_only: Option<bool>,
}

/// Group list response
#[derive(Debug, Serialize)]
pub struct GroupListResponse {
    pub groups: Vec<Group>,
    pub total: usize,
}

/// Group detail response
#[derive(Debug, Serialize)]
pub struct GroupDetailResponse {
    #[serde(flatten)]
    pub detail: GroupDetail,
}

/// Delete confirmation
#[derive(Debug, Serialize)]
pub struct GroupActionResponse {
    pub id: String,
    pub message: String,
}
