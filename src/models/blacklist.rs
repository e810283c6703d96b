use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity hash retained after anonymization
///
/// Stores SHA-256 hexes of the former email and username so neither can be
/// registered again, without keeping the clear values around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub id: String,
    pub user_id: String,
    pub email_hash: String,
    pub username_hash: String,
    pub created_at: DateTime<Utc>,
}

impl BlacklistEntry {
    pub fn new(user_id: &str, email_hash: &str, username_hash: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            email_hash: email_hash.to_string(),
            username_hash: username_hash.to_string(),
            created_at: Utc::now(),
        }
    }
}
