//! Attempt-based rate limiting with lockout
//!
//! Counts failed attempts per (identifier, ip) in the cache and plants a
//! block marker once the limit is reached. The counter write is a plain
//! read-then-set; concurrent attempts may undercount by one, which only
//! delays the lockout by a single attempt.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cache::CacheStore;
use crate::error::Result;

/// Rate limit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Attempts allowed inside the window
    pub max_attempts: u32,
    /// Attempt counting window
    pub window_secs: u64,
    /// Lockout duration once the limit is hit
    pub block_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_secs: 15 * 60,
            block_secs: 30 * 60,
        }
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Under the limit
    Allowed {
        /// Attempts left before lockout
        remaining: u32,
    },
    /// The limit was just reached by this check; a block marker was planted
    JustBlocked { retry_after_secs: u64 },
    /// An earlier check already planted the block marker
    Blocked { retry_after_secs: u64 },
}

impl RateLimitDecision {
    pub fn is_blocked(&self) -> bool {
        !matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Cache-backed attempt limiter
pub struct RateLimiter {
    cache: Arc<dyn CacheStore>,
    config: RateLimitConfig,
    prefix: String,
}

impl RateLimiter {
    pub fn new(cache: Arc<dyn CacheStore>, config: RateLimitConfig) -> Self {
        Self {
            cache,
            config,
            prefix: "ratelimit".to_string(),
        }
    }

    /// Namespace the counter keys, e.g. "reset" or "verify"
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    fn attempts_key(&self, identifier: &str, ip: &str) -> String {
        format!("{}:attempts:{}:{}", self.prefix, identifier, ip)
    }

    fn blocked_key(&self, identifier: &str, ip: &str) -> String {
        format!("{}:blocked:{}:{}", self.prefix, identifier, ip)
    }

    /// Check the current state without recording an attempt
    ///
    /// Reaching the limit plants the block marker, so subsequent checks
    /// report `Blocked` until it expires.
    pub async fn check(&self, identifier: &str, ip: &str) -> Result<RateLimitDecision> {
        let blocked_key = self.blocked_key(identifier, ip);

        if let Some(blocked_until) = self.cache.get(&blocked_key).await? {
            let until_ms: i64 = blocked_until.parse().unwrap_or(0);
            let now_ms = Utc::now().timestamp_millis();
            if now_ms < until_ms {
                return Ok(RateLimitDecision::Blocked {
                    retry_after_secs: ((until_ms - now_ms) / 1000).max(1) as u64,
                });
            }
            self.cache.delete(&blocked_key).await?;
        }

        let attempts = self.current_attempts(identifier, ip).await?;

        if attempts >= self.config.max_attempts {
            let until_ms =
                Utc::now().timestamp_millis() + (self.config.block_secs as i64) * 1000;
            self.cache
                .set(
                    &blocked_key,
                    &until_ms.to_string(),
                    Some(Duration::from_secs(self.config.block_secs)),
                )
                .await?;
            return Ok(RateLimitDecision::JustBlocked {
                retry_after_secs: self.config.block_secs,
            });
        }

        Ok(RateLimitDecision::Allowed {
            remaining: self.config.max_attempts - attempts,
        })
    }

    /// Record a failed attempt, returning the new count
    pub async fn record_attempt(&self, identifier: &str, ip: &str) -> Result<u32> {
        let key = self.attempts_key(identifier, ip);
        let attempts = self.current_attempts(identifier, ip).await? + 1;
        self.cache
            .set(
                &key,
                &attempts.to_string(),
                Some(Duration::from_secs(self.config.window_secs)),
            )
            .await?;
        Ok(attempts)
    }

    /// Forget both the counter and the block marker
    pub async fn clear_attempts(&self, identifier: &str, ip: &str) -> Result<()> {
        self.cache
            .delete_many(&[
                self.attempts_key(identifier, ip),
                self.blocked_key(identifier, ip),
            ])
            .await
    }

    async fn current_attempts(&self, identifier: &str, ip: &str) -> Result<u32> {
        let raw = self.cache.get(&self.attempts_key(identifier, ip)).await?;
        Ok(raw.and_then(|v| v.parse().ok()).unwrap_or(0))
    }
}
