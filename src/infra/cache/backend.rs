//! Cache backend protocol.
//!
//! Backends store opaque strings under keys with a TTL and can drop every
//! key matching a glob pattern. Callers in the repository layer treat any
//! [`CacheError`] as non-fatal.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cache backend failure. Logged by callers, never surfaced to clients.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store used by the cache-aside layer.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Raw value stored under `key`, `None` on miss
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value` under `key` for `ttl_seconds`
    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> CacheResult<()>;

    /// Remove a single key
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Remove every key matching a glob pattern, returning how many went away
    async fn delete_by_pattern(&self, pattern: &str) -> CacheResult<u64>;

    /// Whether the backend answers
    async fn is_healthy(&self) -> bool;

    /// Short backend name for logs and health output
    fn name(&self) -> &'static str;
}

/// Backend that stores nothing. Used when caching is disabled or the
/// remote store is unreachable at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait]
impl CacheBackend for NoopCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl_seconds: u64) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn delete_by_pattern(&self, _pattern: &str) -> CacheResult<u64> {
        Ok(0)
    }

    async fn is_healthy(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
