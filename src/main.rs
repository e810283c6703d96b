use std::sync::Arc;

use tracing::info;
use warden::api::{self, app_state::AppState};
use warden::cache::{CacheStore, MemoryCache, RedisCache};
use warden::config::loader::ConfigLoader;
use warden::observability::{ObservabilityState, create_observability_router, init_tracing};
use warden::security::encryption::Encryption;
use warden::security::keys::KeyGate;
use warden::security::rate_limit::{RateLimitConfig, RateLimiter};
use warden::services::email::{HttpRelayMailer, Mailer, MeteredMailer, NoopMailer};
use warden::services::{
    create_app_key_service, create_auth_service, create_group_service, create_preference_service,
    create_user_service,
};
use warden::storage::repository::{
    SurrealAccessLogRepository, SurrealAppKeyRepository, SurrealBlacklistRepository,
    SurrealGroupRepository, SurrealPreferenceRepository, SurrealTokenRepository,
    SurrealUserRepository,
};
use warden::storage::surrealdb::SurrealPool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load()?;
    ConfigLoader::validate(&config)?;
    init_tracing("warden", config.logging.structured);
    info!("Configuration loaded successfully");

    let db_pool = SurrealPool::new(config.database.clone()).await?;
    info!("Database connection pool initialized");

    let db = db_pool.inner().await;
    let users = Arc::new(SurrealUserRepository::new(db.clone()));
    let app_keys = Arc::new(SurrealAppKeyRepository::new(db.clone()));
    let groups = Arc::new(SurrealGroupRepository::new(db.clone()));
    let preferences = Arc::new(SurrealPreferenceRepository::new(db.clone()));
    let tokens = Arc::new(SurrealTokenRepository::new(db.clone()));
    let access_logs = Arc::new(SurrealAccessLogRepository::new(db.clone()));
    let blacklist = Arc::new(SurrealBlacklistRepository::new(db));
    info!("Repositories initialized");

    let cache: Arc<dyn CacheStore> = match config.cache.backend.as_str() {
        "redis" => Arc::new(RedisCache::connect(&config.cache.redis_url).await?),
        _ => Arc::new(MemoryCache::new()),
    };
    info!(backend = %config.cache.backend, "Cache backend initialized");

    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
    ));

    let transport: Arc<dyn Mailer> = if config.mail.enabled {
        Arc::new(HttpRelayMailer::new(config.mail.clone()))
    } else {
        Arc::new(NoopMailer)
    };
    let mailer: Arc<dyn Mailer> = Arc::new(MeteredMailer::new(
        transport,
        observability_state.metrics.clone(),
    ));

    let encryption = Arc::new(Encryption::from_hex(&config.security.public_key)?);
    let limits = RateLimitConfig {
        max_attempts: config.security.max_attempts,
        window_secs: config.security.window_secs,
        block_secs: config.security.block_secs,
    };

    let key_gate = Arc::new(KeyGate::new(
        config.security.private_key.clone(),
        config.security.public_key.clone(),
        encryption.clone(),
        Arc::new(RateLimiter::new(cache.clone(), limits.clone())),
        app_keys.clone(),
        access_logs.clone(),
        cache.clone(),
    ));
    info!("Key gate initialized");

    let auth_service = create_auth_service(
        users.clone(),
        tokens.clone(),
        cache.clone(),
        mailer.clone(),
        limits,
    );
    let user_service = create_user_service(
        users.clone(),
        tokens.clone(),
        blacklist.clone(),
        cache.clone(),
    );
    let group_service = create_group_service(groups.clone(), cache.clone());
    let preference_service = create_preference_service(preferences.clone(), cache.clone());
    let app_key_service =
        create_app_key_service(app_keys.clone(), access_logs.clone(), cache.clone());
    info!("Services initialized");

    let app_state = AppState {
        db_pool: db_pool.clone(),
        cache,
        encryption,
        key_gate,
        auth_service,
        user_service,
        group_service,
        preference_service,
        app_key_service,
        mailer,
        metrics: observability_state.metrics.clone(),
    };
    info!("Application state created");

    let api_router = api::create_router(app_state);
    let router = create_observability_router(observability_state).merge(api_router);
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
