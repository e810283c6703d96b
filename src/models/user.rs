use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::security::roles::UserRole;

/// Account record
///
/// `password_hash` is an argon2id PHC string and must never reach API
/// responses; handlers serialize users through DTOs, not this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
    /// Role name; unknown values carry no privileges
    pub role: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub settings: Option<serde_json::Value>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user with the default role
    pub fn new(name: &str, email: &str, password_hash: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            is_active: true,
            is_deleted: false,
            name: name.to_string(),
            last_name: None,
            email: email.to_string(),
            username: None,
            password_hash: password_hash.to_string(),
            role: Some(UserRole::View.as_str().to_string()),
            email_verified_at: None,
            settings: None,
            last_login_at: None,
            last_ip: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A user can act only while active and not soft-deleted
    pub fn is_usable(&self) -> bool {
        self.is_active && !self.is_deleted
    }

    /// Parsed role, `None` for missing or unmapped role names
    pub fn parsed_role(&self) -> Option<UserRole> {
        self.role.as_deref().and_then(UserRole::parse)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
