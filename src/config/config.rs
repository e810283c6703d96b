use serde::{Deserialize, Serialize};

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SurrealDB endpoint
    pub url: String,
    /// Namespace
    pub namespace: String,
    /// Database name
    pub database: String,
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Port
    pub port: u16,
    /// Maximum request body size in bytes
    pub max_request_size: usize,
}

/// Security configuration
///
/// `public_key` doubles as the AES-256-GCM key (hex-encoded, 64 chars) and
/// as the expected plaintext of the anonymous gate header. `private_key`
/// grants full access through the key gates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecurityConfig {
    /// Master key for the private-key gate
    pub private_key: String,
    /// Hex-encoded AES-256 key, also the anonymous-gate expected value
    pub public_key: String,
    /// Failed attempts allowed before lockout
    pub max_attempts: u32,
    /// Attempt counting window in seconds
    pub window_secs: u64,
    /// Lockout duration in seconds
    pub block_secs: u64,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend: "memory" or "redis"
    pub backend: String,
    /// Redis endpoint, used when backend = "redis"
    pub redis_url: String,
}

/// Outbound mail configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MailConfig {
    /// Whether dispatch is enabled; disabled uses a no-op mailer
    pub enabled: bool,
    /// HTTP relay endpoint
    pub relay_url: String,
    /// Relay API token
    pub api_token: String,
    /// Default sender address
    pub from_address: String,
    /// Default sender display name
    pub from_name: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Structured (JSON) output
    pub structured: bool,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Database configuration
    pub database: DatabaseConfig,
    /// Server configuration
    pub server: ServerConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Cache configuration
    pub cache: CacheConfig,
    /// Mail configuration
    pub mail: MailConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Application name
    pub app_name: String,
    /// Environment
    pub environment: String,
}

impl AppConfig {
    /// Create development configuration
    pub fn development() -> Self {
        Self {
            database: DatabaseConfig {
                url: "http://localhost:8000".into(),
                namespace: "warden".into(),
                database: "warden".into(),
                username: "root".into(),
                password: "root".into(),
            },
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 3333,
                max_request_size: 10 * 1024 * 1024,
            },
            security: SecurityConfig {
                private_key: "dev-private-key-change-in-production".into(),
                // 32 zero bytes, development only
                public_key: "00".repeat(32),
                max_attempts: 5,
                window_secs: 15 * 60,
                block_secs: 30 * 60,
            },
            cache: CacheConfig {
                backend: "memory".into(),
                redis_url: "redis://localhost:6379".into(),
            },
            mail: MailConfig {
                enabled: false,
                relay_url: "http://localhost:8025/api/send".into(),
                api_token: String::new(),
                from_address: "no-reply@warden.local".into(),
                from_name: "Warden".into(),
            },
            logging: LoggingConfig {
                level: "debug".into(),
                structured: false,
            },
            app_name: "warden".into(),
            environment: "development".into(),
        }
    }

    /// Create production configuration
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.logging.structured = true;
        config.cache.backend = "redis".into();
        config.mail.enabled = true;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults_are_usable() {
        let config = AppConfig::development();
        assert_eq!(config.security.max_attempts, 5);
        assert_eq!(config.security.window_secs, 900);
        assert_eq!(config.security.block_secs, 1800);
        assert_eq!(config.security.public_key.len(), 64);
    }

    #[test]
    fn production_hardens_defaults() {
        let config = AppConfig::production();
        assert_eq!(config.environment, "production");
        assert_eq!(config.cache.backend, "redis");
        assert!(config.mail.enabled);
    }
}
