//! Group management with cached reads.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::CacheStore;
use crate::error::{AppError, Result};
use crate::models::group::{Group, GroupAccessRole, UserGroup};
use crate::storage::repository::GroupRepository;

const LIST_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Group with its access roles and memberships
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub access_roles: Vec<GroupAccessRole>,
    pub members: Vec<UserGroup>,
}

/// New group payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupInput {
    pub name: String,
    pub description: Option<String>,
}

/// Partial group update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGroupInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

/// Group operations
#[async_trait]
pub trait GroupService: Send + Sync {
    /// List groups; the unfiltered listing is cached
    async fn list(&self, active_only: bool) -> Result<Vec<Group>>;
    async fn show(&self, id: &str) -> Result<GroupDetail>;
    async fn create(&self, input: CreateGroupInput) -> Result<Group>;
    async fn update(&self, id: &str, input: UpdateGroupInput) -> Result<Group>;
    async fn delete(&self, id: &str) -> Result<()>;
    async fn toggle_status(&self, id: &str) -> Result<Group>;
}

pub struct GroupServiceImpl {
    groups: Arc<dyn GroupRepository>,
    cache: Arc<dyn CacheStore>,
}

impl GroupServiceImpl {
    pub fn new(groups: Arc<dyn GroupRepository>, cache: Arc<dyn CacheStore>) -> Self {
        Self { groups, cache }
    }

    fn detail_cache_key(id: &str) -> String {
        format!("group-{}", id)
    }

    async fn invalidate(&self, id: &str) {
        let keys = ["groups".to_string(), Self::detail_cache_key(id)];
        if let Err(e) = self.cache.delete_many(&keys).await {
            warn!(group_id = %id, error = %e, "failed to invalidate group cache");
        }
    }

    async fn find(&self, id: &str) -> Result<Group> {
        self.groups
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::business(404, "GROUP_NOT_FOUND", "Group not found"))
    }
}

#[async_trait]
impl GroupService for GroupServiceImpl {
    async fn list(&self, active_only: bool) -> Result<Vec<Group>> {
        if active_only {
            return self.groups.list(true).await;
        }

        if let Some(cached) = self.cache.get("groups").await? {
            if let Ok(groups) = serde_json::from_str::<Vec<Group>>(&cached) {
                return Ok(groups);
            }
        }

        let groups = self.groups.list(false).await?;
        if let Ok(serialized) = serde_json::to_string(&groups) {
            if let Err(e) = self
                .cache
                .set("groups", &serialized, Some(LIST_CACHE_TTL))
                .await
            {
                warn!(error = %e, "failed to cache group list");
            }
        }
        Ok(groups)
    }

    async fn show(&self, id: &str) -> Result<GroupDetail> {
        let cache_key = Self::detail_cache_key(id);
        if let Some(cached) = self.cache.get(&cache_key).await? {
            if let Ok(detail) = serde_json::from_str::<GroupDetail>(&cached) {
                return Ok(detail);
            }
        }

        let detail = GroupDetail {
            group: self.find(id).await?,
            access_roles: self.groups.list_access_roles(id).await?,
            members: self.groups.list_members(id).await?,
        };

        if let Ok(serialized) = serde_json::to_string(&detail) {
            if let Err(e) = self
                .cache
                .set(&cache_key, &serialized, Some(LIST_CACHE_TTL))
                .await
            {
                warn!(group_id = %id, error = %e, "failed to cache group detail");
            }
        }
        Ok(detail)
    }

    async fn create(&self, input: CreateGroupInput) -> Result<Group> {
        let group = Group::new(&input.name, input.description);
        let created = self.groups.create(&group).await?;
        self.invalidate(&created.id).await;
        Ok(created)
    }

    async fn update(&self, id: &str, input: UpdateGroupInput) -> Result<Group> {
        let mut group = self.find(id).await?;

        if let Some(name) = input.name {
            group.name = name;
        }
        if let Some(description) = input.description {
            group.description = Some(description);
        }
        if let Some(active) = input.active {
            group.active = active;
        }
        group.touch();

        let updated = self
            .groups
            .update(id, &group)
            .await?
            .ok_or_else(|| AppError::business(404, "GROUP_NOT_FOUND", "Group not found"))?;

        self.invalidate(id).await;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if !self.groups.delete(id).await? {
            return Err(AppError::business(404, "GROUP_NOT_FOUND", "Group not found"));
        }
        self.invalidate(id).await;
        Ok(())
    }

    async fn toggle_status(&self, id: &str) -> Result<Group> {
        let group = self.find(id).await?;
        self.update(
            id,
            UpdateGroupInput {
                active: Some(!group.active),
                ..Default::default()
            },
        )
        .await
    }
}

/// Build the default group service
pub fn create_group_service(
    groups: Arc<dyn GroupRepository>,
    cache: Arc<dyn CacheStore>,
) -> Arc<dyn GroupService> {
    Arc::new(GroupServiceImpl::new(groups, cache))
}
