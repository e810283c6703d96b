use crate::config::config::AppConfig;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use std::path::PathBuf;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the default path
    ///
    /// Sources, later wins:
    /// 1. ./warden.toml
    /// 2. WARDEN_-prefixed environment variables
    pub fn load() -> Result<AppConfig, figment::Error> {
        Figment::from(figment::providers::Serialized::defaults(
            AppConfig::development(),
        ))
        .merge(Toml::file("warden.toml"))
        .merge(Env::prefixed("WARDEN_").split("_").global())
        .extract()
    }

    /// Load configuration from a given path
    pub fn load_from(path: PathBuf) -> Result<AppConfig, figment::Error> {
        Figment::from(figment::providers::Serialized::defaults(
            AppConfig::development(),
        ))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WARDEN_").split("_").global())
        .extract()
    }

    /// Validate a loaded configuration
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.database.url.is_empty() {
            return Err(ConfigValidationError::MissingDatabaseUrl);
        }

        if config.security.public_key.len() != 64
            || hex::decode(&config.security.public_key).is_err()
        {
            return Err(ConfigValidationError::InvalidPublicKey);
        }

        if config.cache.backend != "memory" && config.cache.backend != "redis" {
            return Err(ConfigValidationError::UnknownCacheBackend(
                config.cache.backend.clone(),
            ));
        }

        if config.environment == "production" && config.security.private_key.starts_with("dev-") {
            return Err(ConfigValidationError::DevKeyInProduction);
        }

        Ok(())
    }
}

/// Configuration validation error
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("server port must be greater than 0")]
    InvalidPort,

    #[error("database URL is not configured")]
    MissingDatabaseUrl,

    #[error("security.public_key must be a 64-character hex string")]
    InvalidPublicKey,

    #[error("unknown cache backend: {0}")]
    UnknownCacheBackend(String),

    #[error("development private key must not be used in production")]
    DevKeyInProduction,
}

/// Default configuration file path
pub fn default_config_path() -> PathBuf {
    PathBuf::from("warden.toml")
}

/// Whether a configuration file exists at the default path
pub fn config_exists() -> bool {
    default_config_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_development_defaults() {
        let config = AppConfig::development();
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn validate_rejects_short_public_key() {
        let mut config = AppConfig::development();
        config.security.public_key = "abcd".into();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidPublicKey)
        ));
    }

    #[test]
    fn validate_rejects_dev_key_in_production() {
        let mut config = AppConfig::production();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::DevKeyInProduction)
        ));
        config.security.private_key = "a-real-secret".into();
        assert!(ConfigLoader::validate(&config).is_ok());
    }
}
