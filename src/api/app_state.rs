use std::sync::Arc;

use crate::cache::CacheStore;
use crate::observability::AppMetrics;
use crate::security::encryption::Encryption;
use crate::security::keys::KeyGate;
use crate::services::app_key::AppKeyService;
use crate::services::auth::AuthService;
use crate::services::email::Mailer;
use crate::services::group::GroupService;
use crate::services::preference::PreferenceService;
use crate::services::user::UserService;
use crate::storage::surrealdb::SurrealPool;

/// Application state containing all shared services and security components
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db_pool: SurrealPool,
    /// Shared cache backend
    pub cache: Arc<dyn CacheStore>,
    /// Payload encryption helper
    pub encryption: Arc<Encryption>,
    /// Key gatekeeper backing the gate middleware
    pub key_gate: Arc<KeyGate>,
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Group service
    pub group_service: Arc<dyn GroupService>,
    /// Preference service
    pub preference_service: Arc<dyn PreferenceService>,
    /// API key service
    pub app_key_service: Arc<dyn AppKeyService>,
    /// Outbound mail transport
    pub mailer: Arc<dyn Mailer>,
    /// Request metrics
    pub metrics: Arc<AppMetrics>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db_pool", &"SurrealPool")
            .field("cache", &"Arc<dyn CacheStore>")
            .field("key_gate", &"Arc<KeyGate>")
            .field("auth_service", &"Arc<dyn AuthService>")
            .field("user_service", &"Arc<dyn UserService>")
            .field("group_service", &"Arc<dyn GroupService>")
            .field("preference_service", &"Arc<dyn PreferenceService>")
            .field("app_key_service", &"Arc<dyn AppKeyService>")
            .field("mailer", &"Arc<dyn Mailer>")
            .finish()
    }
}
