//! API key administration and gate audit log access.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde::Deserialize;
use tracing::info;

use crate::cache::CacheStore;
use crate::error::{AppError, Result};
use crate::models::access_log::KeyAccessLog;
use crate::models::app_key::AppKey;
use crate::security::keys::{KeyGate, generate_token};
use crate::storage::repository::{AccessLogRepository, AppKeyRepository};

/// New key payload; a value is generated when absent
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppKeyInput {
    pub description: String,
    pub value: Option<String>,
    pub permission: Option<Vec<String>>,
    /// Days until expiry; no value means the key never expires
    pub days_expires: Option<i64>,
}

/// Partial key update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppKeyInput {
    pub description: Option<String>,
    pub active: Option<bool>,
    pub permission: Option<Vec<String>>,
    pub days_expires: Option<i64>,
}

/// API key operations
#[async_trait]
pub trait AppKeyService: Send + Sync {
    async fn list(&self) -> Result<Vec<AppKey>>;
    async fn find(&self, id: &str) -> Result<AppKey>;
    async fn create(&self, input: CreateAppKeyInput) -> Result<AppKey>;
    async fn update(&self, id: &str, input: UpdateAppKeyInput) -> Result<AppKey>;
    async fn delete(&self, id: &str) -> Result<()>;
    /// Plant or remove the temporary blocklist marker for a key
    async fn set_blocked(&self, id: &str, blocked: bool) -> Result<()>;
    async fn access_logs(&self, limit: usize, start: usize) -> Result<Vec<KeyAccessLog>>;
}

pub struct AppKeyServiceImpl {
    keys: Arc<dyn AppKeyRepository>,
    logs: Arc<dyn AccessLogRepository>,
    cache: Arc<dyn CacheStore>,
}

impl AppKeyServiceImpl {
    pub fn new(
        keys: Arc<dyn AppKeyRepository>,
        logs: Arc<dyn AccessLogRepository>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self { keys, logs, cache }
    }

    fn not_found(id: &str) -> AppError {
        AppError::business(404, "APP_KEY_NOT_FOUND", &format!("API key not found: {}", id))
    }

    fn expiry_from_days(days: i64) -> chrono::DateTime<Utc> {
        Utc::now() + ChronoDuration::days(days)
    }
}

#[async_trait]
impl AppKeyService for AppKeyServiceImpl {
    async fn list(&self) -> Result<Vec<AppKey>> {
        self.keys.list().await
    }

    async fn find(&self, id: &str) -> Result<AppKey> {
        self.keys
            .get_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, input: CreateAppKeyInput) -> Result<AppKey> {
        let value = input.value.unwrap_or_else(generate_token);
        let expires_at = input.days_expires.map(Self::expiry_from_days);

        let mut key = AppKey::new(&input.description, &value, expires_at);
        key.permission = input.permission;

        let created = self.keys.create(&key).await?;
        info!(key_id = %created.id, "api key created");
        Ok(created)
    }

    async fn update(&self, id: &str, input: UpdateAppKeyInput) -> Result<AppKey> {
        let mut key = self.find(id).await?;

        if let Some(description) = input.description {
            key.description = description;
        }
        if let Some(active) = input.active {
            key.active = active;
        }
        if let Some(permission) = input.permission {
            key.permission = Some(permission);
        }
        if let Some(days) = input.days_expires {
            key.expires_at = Some(Self::expiry_from_days(days));
        }
        key.updated_at = Utc::now();

        self.keys
            .update(id, &key)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if !self.keys.delete(id).await? {
            return Err(Self::not_found(id));
        }
        self.cache.delete(&KeyGate::block_marker(id)).await?;
        info!(key_id = %id, "api key deleted");
        Ok(())
    }

    async fn set_blocked(&self, id: &str, blocked: bool) -> Result<()> {
        // Ensure the key exists before touching the marker.
        self.find(id).await?;

        let marker = KeyGate::block_marker(id);
        if blocked {
            self.cache.set(&marker, "1", None).await?;
        } else {
            self.cache.delete(&marker).await?;
        }
        Ok(())
    }

    async fn access_logs(&self, limit: usize, start: usize) -> Result<Vec<KeyAccessLog>> {
        self.logs.list(limit, start).await
    }
}

/// Build the default API key service
pub fn create_app_key_service(
    keys: Arc<dyn AppKeyRepository>,
    logs: Arc<dyn AccessLogRepository>,
    cache: Arc<dyn CacheStore>,
) -> Arc<dyn AppKeyService> {
    Arc::new(AppKeyServiceImpl::new(keys, logs, cache))
}
