use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit record of one gate decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyAccessLog {
    pub id: String,
    pub ip: String,
    pub key_id: Option<String>,
    /// Gate event, e.g. "private_key_invalid" or "api_key_valid"
    pub event: String,
    pub success: bool,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl KeyAccessLog {
    pub fn new(ip: &str, event: &str, success: bool, reason: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ip: ip.to_string(),
            key_id: None,
            event: event.to_string(),
            success,
            reason: reason.map(|r| r.to_string()),
            created_at: Utc::now(),
        }
    }

    pub fn with_key_id(mut self, key_id: &str) -> Self {
        self.key_id = Some(key_id.to_string());
        self
    }
}
