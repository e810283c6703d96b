use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client API key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppKey {
    pub id: String,
    pub description: String,
    /// Opaque secret presented in the `apiKey` header; never logged in clear
    pub value: String,
    pub active: bool,
    /// Optional list of permitted scopes
    pub permission: Option<Vec<String>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppKey {
    pub fn new(description: &str, value: &str, expires_at: Option<DateTime<Utc>>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            value: value.to_string(),
            active: true,
            permission: None,
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Usable iff active and not past its expiry
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.map(|at| at > now).unwrap_or(true)
    }
}
