//! Caching layer: backend protocol, Redis and no-op backends, and the
//! cache-aside helper used by the repository decorators.

mod aside;
mod backend;
mod redis;

pub use aside::CacheAside;
pub use backend::{CacheBackend, CacheError, CacheResult, NoopCache};
pub use self::redis::RedisCache;

#[cfg(any(test, feature = "test-utils"))]
pub use backend::MockCacheBackend;

use std::sync::Arc;

use crate::config::{CacheConfig, Config};

/// Build the cache-aside helper for the given configuration.
///
/// An unreachable Redis downgrades to [`NoopCache`] with caching disabled so
/// the API keeps serving from the database.
pub async fn connect(config: &Config) -> CacheAside {
    if !config.cache.enabled {
        tracing::info!("Cache disabled by configuration");
        return CacheAside::disabled();
    }

    match RedisCache::connect(&config.redis_url).await {
        Ok(redis) => CacheAside::new(Arc::new(redis), Arc::new(config.cache.clone())),
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable, continuing without cache");
            CacheAside::new(Arc::new(NoopCache), Arc::new(CacheConfig::disabled()))
        }
    }
}
