//! Key gatekeeping
//!
//! Validates the `apiKey` and `publicKey` headers: the private master key,
//! per-client keys from the database, and the encrypted anonymous key. Every
//! private/api attempt is audited; audit failures never break the request.

use std::sync::Arc;

use chrono::Utc;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::cache::CacheStore;
use crate::error::{AppError, Result};
use crate::models::access_log::KeyAccessLog;
use crate::models::app_key::AppKey;
use crate::security::encryption::Encryption;
use crate::security::rate_limit::RateLimiter;
use crate::storage::repository::{AccessLogRepository, AppKeyRepository};

/// Constant-time equality for key material
///
/// Length is compared first; equal-length inputs are compared without
/// data-dependent branching.
pub fn safe_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// SHA-256 hex digest
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Random 32-byte token as hex
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Access granted by the api-key gate
#[derive(Debug, Clone)]
pub enum KeyAccess {
    /// The private master key was presented
    Full,
    /// A client key matched
    Key(AppKey),
}

/// Gatekeeper for the key-based middleware
pub struct KeyGate {
    private_key: String,
    public_key: String,
    encryption: Arc<Encryption>,
    rate_limiter: Arc<RateLimiter>,
    app_keys: Arc<dyn AppKeyRepository>,
    access_logs: Arc<dyn AccessLogRepository>,
    cache: Arc<dyn CacheStore>,
}

impl KeyGate {
    pub fn new(
        private_key: String,
        public_key: String,
        encryption: Arc<Encryption>,
        rate_limiter: Arc<RateLimiter>,
        app_keys: Arc<dyn AppKeyRepository>,
        access_logs: Arc<dyn AccessLogRepository>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            private_key,
            public_key,
            encryption,
            rate_limiter,
            app_keys,
            access_logs,
            cache,
        }
    }

    /// Blocklist marker for a key id
    pub fn block_marker(key_id: &str) -> String {
        format!("appkey:blocked:{}", key_id)
    }

    /// Validate the private master key header
    pub async fn check_private_key(&self, header: Option<&str>, ip: &str) -> Result<()> {
        let Some(api_key) = header.filter(|v| !v.is_empty()) else {
            self.audit(ip, "private_key_missing", false, Some("Private key not provided"), None)
                .await;
            return Err(AppError::business(
                401,
                "private_key_missing",
                "Private key not provided",
            ));
        };

        if self.rate_limiter.check(api_key, ip).await?.is_blocked() {
            self.audit(
                ip,
                "private_key_rate_limited",
                false,
                Some("Too many consecutive attempts"),
                None,
            )
            .await;
            return Err(AppError::business(
                429,
                "private_key_rate_limited",
                "Too many attempts. Please try again later.",
            ));
        }

        if self.private_key.is_empty() {
            return Err(AppError::business(
                500,
                "private_key_not_configured",
                "Private key not configured on the server",
            ));
        }

        if !safe_compare(&self.private_key, api_key) {
            self.audit(ip, "private_key_invalid", false, Some("Invalid private key"), None)
                .await;
            self.rate_limiter.record_attempt(api_key, ip).await?;
            return Err(AppError::business(
                401,
                "private_key_invalid",
                "Invalid private key",
            ));
        }

        self.rate_limiter.clear_attempts(api_key, ip).await?;
        self.audit(ip, "private_key_valid", true, Some("Valid private key"), None)
            .await;
        Ok(())
    }

    /// Validate a client key header, with a private-key fast path
    pub async fn check_app_key(&self, header: Option<&str>, ip: &str) -> Result<KeyAccess> {
        let Some(api_key) = header.filter(|v| !v.is_empty()) else {
            self.audit(ip, "api_key_missing", false, Some("API key not provided"), None)
                .await;
            return Err(AppError::business(
                401,
                "api_key_missing",
                "API key not provided",
            ));
        };

        if self.rate_limiter.check(api_key, ip).await?.is_blocked() {
            self.audit(
                ip,
                "api_key_rate_limited",
                false,
                Some("Too many consecutive attempts"),
                None,
            )
            .await;
            return Err(AppError::business(
                429,
                "api_key_rate_limited",
                "Too many attempts. Please try again later.",
            ));
        }

        if !self.private_key.is_empty() && safe_compare(&self.private_key, api_key) {
            self.rate_limiter.clear_attempts(api_key, ip).await?;
            self.audit(ip, "api_key_valid_private", true, Some("Valid private key"), None)
                .await;
            return Ok(KeyAccess::Full);
        }

        let now = Utc::now();
        let active_keys: Vec<AppKey> = self
            .app_keys
            .list_active()
            .await?
            .into_iter()
            .filter(|k| k.is_usable(now))
            .collect();

        if active_keys.is_empty() {
            self.audit(ip, "api_key_not_found", false, Some("No active API keys"), None)
                .await;
            return Err(AppError::business(
                401,
                "api_key_not_found",
                "No active API keys",
            ));
        }

        let Some(valid_key) = active_keys.into_iter().find(|k| safe_compare(&k.value, api_key))
        else {
            self.audit(ip, "api_key_invalid", false, Some("Invalid API key"), None)
                .await;
            self.rate_limiter.record_attempt(api_key, ip).await?;
            return Err(AppError::business(401, "api_key_invalid", "Invalid API key"));
        };

        if self.is_key_blocked(&valid_key.id).await? {
            self.audit(
                ip,
                "api_key_blocked",
                false,
                Some("API key is blocked"),
                Some(&valid_key.id),
            )
            .await;
            return Err(AppError::business(403, "api_key_blocked", "API key is blocked"));
        }

        self.rate_limiter.clear_attempts(api_key, ip).await?;
        self.audit(ip, "api_key_valid", true, Some("Valid API key"), Some(&valid_key.id))
            .await;

        Ok(KeyAccess::Key(valid_key))
    }

    /// Validate the anonymous gate header
    ///
    /// The header carries the configured public key encrypted and
    /// base64-wrapped; any decryption failure reads as an invalid key.
    pub fn check_public_key(&self, header: Option<&str>) -> Result<()> {
        let Some(payload) = header.filter(|v| !v.is_empty()) else {
            return Err(AppError::business(
                401,
                "public_key_missing",
                "Public key not provided",
            ));
        };

        let decrypted = self.encryption.decrypt_base64(payload).map_err(|_| {
            AppError::business(401, "public_key_invalid", "Invalid public key")
        })?;

        if decrypted != self.public_key {
            return Err(AppError::business(
                401,
                "public_key_invalid",
                "Invalid public key",
            ));
        }

        Ok(())
    }

    /// Whether a blocklist marker exists for the key id
    pub async fn is_key_blocked(&self, key_id: &str) -> Result<bool> {
        Ok(self.cache.get(&Self::block_marker(key_id)).await?.is_some())
    }

    async fn audit(
        &self,
        ip: &str,
        event: &str,
        success: bool,
        reason: Option<&str>,
        key_id: Option<&str>,
    ) {
        let mut entry = KeyAccessLog::new(ip, event, success, reason);
        if let Some(key_id) = key_id {
            entry = entry.with_key_id(key_id);
        }
        if let Err(e) = self.access_logs.create(&entry).await {
            warn!(event, error = %e, "failed to persist key access log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_compare_matches_equal_strings() {
        assert!(safe_compare("secret-key", "secret-key"));
        assert!(!safe_compare("secret-key", "secret-kez"));
        assert!(!safe_compare("short", "longer-value"));
        assert!(!safe_compare("", "x"));
        assert!(safe_compare("", ""));
    }

    #[test]
    fn sha256_hex_is_stable() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn generated_tokens_are_unique_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(hex::decode(&a).is_ok());
    }
}
