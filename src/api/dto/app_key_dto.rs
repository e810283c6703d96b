//! API key DTOs
//!
//! Served only behind the private-key gate, so responses carry the key
//! value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::access_log::KeyAccessLog;
use crate::models::app_key::AppKey;

/// Create key request; a value is generated when absent
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAppKeyRequest {
    #[validate(length(min = 3, max = 255))]
    pub description: String,
    #[validate(length(min = 16, max = 255))]
    pub value: Option<String>,
    pub permission: Option<Vec<String>>,
    #[validate(range(min = 1, max = 3650))]
    pub days_expires: Option<i64>,
}

/// Update key request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAppKeyRequest {
    #[validate(length(min = 3, max = 255))]
    pub description: Option<String>,
    pub active: Option<bool>,
    pub permission: Option<Vec<String>>,
    #[validate(range(min = 1, max = 3650))]
    pub days_expires: Option<i64>,
}

/// Toggle the temporary blocklist marker
#[derive(Debug, Deserialize)]
pub struct BlockAppKeyRequest {
    pub blocked: bool,
}

/// API key representation
#[derive(Debug, Serialize)]
pub struct AppKeyResponse {
    pub id: String,
    pub description: String,
    pub value: String,
    pub active: bool,
    pub permission: Option<Vec<String>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AppKey> for AppKeyResponse {
    fn from(key: AppKey) -> Self {
        Self {
            id: key.id,
            description: key.description,
            value: key.value,
            active: key.active,
            permission: key.permission,
            expires_at: key.expires_at,
            created_at: key.created_at,
            updated_at: key.updated_at,
        }
    }
}

/// Key list response
#[derive(Debug, Serialize)]
pub struct AppKeyListResponse {
    pub keys: Vec<AppKeyResponse>,
    pub total: usize,
}

/// Gate audit log page
#[derive(Debug, Serialize)]
pub struct AccessLogListResponse {
    pub logs: Vec<KeyAccessLog>,
    pub limit: usize,
    pub start: usize,
}

/// Paging parameters for the audit log
#[derive(Debug, Default, Deserialize)]
pub struct AccessLogParams {
    pub limit: Option<usize>,
    pub start: Option<usize>,
}
