//! Cache abstraction
//!
//! Every cross-request piece of mutable state (rate-limit counters, reset
//! tokens, cached entities, key blocklist markers) lives behind this trait so
//! the backend can be swapped between the in-process store and Redis.

pub mod memory;
pub mod redis;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Key-value cache with per-entry TTL
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value, `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value with an optional TTL
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Delete a key; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete several keys
    async fn delete_many(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.delete(key).await?;
        }
        Ok(())
    }
}

pub use memory::MemoryCache;
pub use redis::RedisCache;
