//! Preference DTOs

use serde::{Deserialize, Serialize};

use crate::models::preference::Preference;

/// Create or update a preference value
#[derive(Debug, Deserialize)]
pub struct PreferenceValueRequest {
    pub value: serde_json::Value,
}

/// Preference list response
#[derive(Debug, Serialize)]
pub struct PreferenceListResponse {
    pub preferences: Vec<Preference>,
    pub total: usize,
}

/// Delete confirmation
#[derive(Debug, Serialize)]
pub struct PreferenceActionResponse {
    pub name: String,
    pub message: String,
}
