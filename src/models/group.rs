use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn new(name: &str, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Per-table abilities granted to a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAccessRole {
    pub id: String,
    pub group_id: String,
    pub table_name: String,
    /// Ability map, e.g. {"read": true, "write": false}
    pub abilities: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl GroupAccessRole {
    pub fn new(group_id: &str, table_name: &str, abilities: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.to_string(),
            table_name: table_name.to_string(),
            abilities,
            created_at: Utc::now(),
        }
    }
}

/// Group membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: String,
    pub user_id: String,
    pub group_id: String,
    pub created_at: DateTime<Utc>,
}

impl UserGroup {
    pub fn new(user_id: &str, group_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            group_id: group_id.to_string(),
            created_at: Utc::now(),
        }
    }
}
