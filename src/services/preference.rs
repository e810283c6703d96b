//! Named preferences with cached reads.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::cache::CacheStore;
use crate::error::{AppError, Result};
use crate::models::preference::Preference;
use crate::storage::repository::PreferenceRepository;

const CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Preference operations
#[async_trait]
pub trait PreferenceService: Send + Sync {
    async fn list(&self) -> Result<Vec<Preference>>;
    async fn show(&self, name: &str) -> Result<Preference>;
    async fn store(&self, name: &str, value: serde_json::Value) -> Result<Preference>;
    async fn update(&self, name: &str, value: serde_json::Value) -> Result<Preference>;
    async fn delete(&self, name: &str) -> Result<()>;
}

pub struct PreferenceServiceImpl {
    preferences: Arc<dyn PreferenceRepository>,
    cache: Arc<dyn CacheStore>,
}

impl PreferenceServiceImpl {
    pub fn new(preferences: Arc<dyn PreferenceRepository>, cache: Arc<dyn CacheStore>) -> Self {
        Self { preferences, cache }
    }

    fn cache_key(name: &str) -> String {
        format!("preference-{}", name)
    }

    async fn invalidate(&self, name: &str) {
        let keys = ["preferences".to_string(), Self::cache_key(name)];
        if let Err(e) = self.cache.delete_many(&keys).await {
            warn!(name = %name, error = %e, "failed to invalidate preference cache");
        }
    }

    fn not_found(name: &str) -> AppError {
        AppError::business(
            404,
            "PREFERENCE_NOT_FOUND",
            &format!("Preference not found: {}", name),
        )
    }
}

#[async_trait]
impl PreferenceService for PreferenceServiceImpl {
    async fn list(&self) -> Result<Vec<Preference>> {
        if let Some(cached) = self.cache.get("preferences").await? {
            if let Ok(preferences) = serde_json::from_str::<Vec<Preference>>(&cached) {
                return Ok(preferences);
            }
        }

        let preferences = self.preferences.list().await?;
        if let Ok(serialized) = serde_json::to_string(&preferences) {
            if let Err(e) = self
                .cache
                .set("preferences", &serialized, Some(CACHE_TTL))
                .await
            {
                warn!(error = %e, "failed to cache preference list");
            }
        }
        Ok(preferences)
    }

    async fn show(&self, name: &str) -> Result<Preference> {
        let cache_key = Self::cache_key(name);
        if let Some(cached) = self.cache.get(&cache_key).await? {
            if let Ok(preference) = serde_json::from_str::<Preference>(&cached) {
                return Ok(preference);
            }
        }

        let preference = self
            .preferences
            .get_by_name(name)
            .await?
            .ok_or_else(|| Self::not_found(name))?;

        if let Ok(serialized) = serde_json::to_string(&preference) {
            if let Err(e) = self.cache.set(&cache_key, &serialized, Some(CACHE_TTL)).await {
                warn!(name = %name, error = %e, "failed to cache preference");
            }
        }
        Ok(preference)
    }

    async fn store(&self, name: &str, value: serde_json::Value) -> Result<Preference> {
        if self.preferences.get_by_name(name).await?.is_some() {
            return Err(AppError::business(
                409,
                "PREFERENCE_ALREADY_EXISTS",
                &format!("Preference already exists: {}", name),
            ));
        }

        let created = self.preferences.create(&Preference::new(name, value)).await?;
        self.invalidate(name).await;
        Ok(created)
    }

    async fn update(&self, name: &str, value: serde_json::Value) -> Result<Preference> {
        let mut preference = self
            .preferences
            .get_by_name(name)
            .await?
            .ok_or_else(|| Self::not_found(name))?;

        preference.value = value;
        preference.updated_at = chrono::Utc::now();

        let updated = self
            .preferences
            .update(&preference.id, &preference)
            .await?
            .ok_or_else(|| Self::not_found(name))?;

        self.invalidate(name).await;
        Ok(updated)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let preference = self
            .preferences
            .get_by_name(name)
            .await?
            .ok_or_else(|| Self::not_found(name))?;

        self.preferences.delete(&preference.id).await?;
        self.invalidate(name).await;
        Ok(())
    }
}

/// Build the default preference service
pub fn create_preference_service(
    preferences: Arc<dyn PreferenceRepository>,
    cache: Arc<dyn CacheStore>,
) -> Arc<dyn PreferenceService> {
    Arc::new(PreferenceServiceImpl::new(preferences, cache))
}
