//! Cache-aside helper shared by every cached repository.
//!
//! Reads go through [`CacheAside::read`]: hit returns the stored value, miss
//! runs the source and stores a successful result. Writes go through
//! [`CacheAside::write`], which clears the domain's invalidation patterns
//! once the write succeeded. Backend failures are logged and swallowed.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::backend::{CacheBackend, NoopCache};
use crate::config::{CacheConfig, CacheDomain};

/// Stored shape of a cached value. The `cached` flag tells a cached `null`
/// apart from a missing key.
#[derive(Debug, Deserialize)]
struct CacheEntry<T> {
    cached: bool,
    data: T,
}

#[derive(Serialize)]
struct CacheEntryRef<'a, T> {
    cached: bool,
    data: &'a T,
}

/// Backend plus configuration, cloned into every decorator.
#[derive(Clone)]
pub struct CacheAside {
    backend: Arc<dyn CacheBackend>,
    config: Arc<CacheConfig>,
}

impl CacheAside {
    pub fn new(backend: Arc<dyn CacheBackend>, config: Arc<CacheConfig>) -> Self {
        Self { backend, config }
    }

    /// Caching switched off: every call delegates straight to the source.
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopCache), Arc::new(CacheConfig::disabled()))
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn backend(&self) -> Arc<dyn CacheBackend> {
        Arc::clone(&self.backend)
    }

    /// `{prefix}{domain}:{method}:{arg1}:{arg2}...`, or
    /// `{prefix}{domain}:{method}` without arguments.
    pub fn key(&self, domain: CacheDomain, method: &str, args: &[&(dyn Display + Sync)]) -> String {
        let mut key = format!("{}{}:{}", self.config.key_prefix, domain, method);
        for arg in args {
            key.push(':');
            key.push_str(&arg.to_string());
        }
        key
    }

    /// Cached read of `method(args)` in `domain`, using the domain TTL.
    pub async fn read<T, E, F, Fut>(
        &self,
        domain: CacheDomain,
        method: &str,
        args: &[&(dyn Display + Sync)],
        source: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send,
        E: Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
    {
        if !self.is_enabled() {
            return source().await;
        }

        let key = self.key(domain, method, args);
        let ttl = self.config.ttl_for(domain);
        self.get_or_load(&key, ttl, source).await
    }

    /// Return the entry stored under `key`, or run `source` and store its
    /// successful result for `ttl_seconds`. The source result is returned
    /// unchanged.
    pub async fn get_or_load<T, E, F, Fut>(
        &self,
        key: &str,
        ttl_seconds: u64,
        source: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send,
        E: Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
    {
        if let Some(value) = self.lookup::<T>(key).await {
            tracing::debug!(key, "cache hit");
            return Ok(value);
        }

        let result = source().await;

        if let Ok(value) = &result {
            self.store(key, value, ttl_seconds).await;
        }

        result
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, falling back to source");
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry<T>>(&raw) {
            Ok(entry) if entry.cached => Some(entry.data),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(key, error = %e, "ignoring malformed cache entry");
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) {
        let entry = CacheEntryRef {
            cached: true,
            data: value,
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache entry serialization failed");
                return;
            }
        };

        if let Err(e) = self.backend.set(key, json, ttl_seconds).await {
            tracing::warn!(key, error = %e, "cache write failed");
        }
    }

    /// Await a write, then clear the domain's patterns if it succeeded.
    pub async fn write<T, E, Fut>(&self, domain: CacheDomain, operation: Fut) -> Result<T, E>
    where
        T: Send,
        E: Send,
        Fut: Future<Output = Result<T, E>> + Send,
    {
        let result = operation.await;

        if result.is_ok() && self.is_enabled() {
            self.invalidate_domains(&[domain]).await;
        }

        result
    }

    /// Clear the union of the given domains' invalidation patterns.
    pub async fn invalidate_domains(&self, domains: &[CacheDomain]) {
        let mut patterns: Vec<&'static str> = Vec::new();
        for domain in domains {
            for pattern in domain.invalidation_patterns() {
                if !patterns.contains(pattern) {
                    patterns.push(pattern);
                }
            }
        }

        self.invalidate_patterns(&patterns).await;
    }

    /// Delete every prefixed pattern concurrently. Each failure is logged on
    /// its own and does not stop the other deletions.
    pub async fn invalidate_patterns(&self, patterns: &[&str]) {
        if !self.is_enabled() || patterns.is_empty() {
            return;
        }

        let prefixed: Vec<String> = patterns
            .iter()
            .map(|pattern| format!("{}{}", self.config.key_prefix, pattern))
            .collect();

        let results = join_all(
            prefixed
                .iter()
                .map(|pattern| self.backend.delete_by_pattern(pattern)),
        )
        .await;

        for (pattern, result) in prefixed.iter().zip(results) {
            match result {
                Ok(deleted) => tracing::debug!(pattern, deleted, "cache invalidated"),
                Err(e) => tracing::warn!(pattern, error = %e, "cache invalidation failed"),
            }
        }
    }
}

impl std::fmt::Debug for CacheAside {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAside")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::infra::cache::{CacheError, MockCacheBackend};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: i32,
        label: String,
    }

    fn item() -> Item {
        Item {
            id: 1,
            label: "one".to_string(),
        }
    }

    fn aside(mock: MockCacheBackend) -> CacheAside {
        CacheAside::new(Arc::new(mock), Arc::new(CacheConfig::default()))
    }

    fn unavailable() -> CacheError {
        CacheError::Unavailable("connection refused".to_string())
    }

    #[test]
    fn test_key_format() {
        let cache = CacheAside::new(Arc::new(NoopCache), Arc::new(CacheConfig::default()));
        assert_eq!(
            cache.key(CacheDomain::Car, "findById", &[&1]),
            "covoitapi:car:findById:1"
        );
        assert_eq!(
            cache.key(CacheDomain::Model, "findByNameAndBrand", &[&"Clio", &4]),
            "covoitapi:model:findByNameAndBrand:Clio:4"
        );
        assert_eq!(cache.key(CacheDomain::Brand, "findAll", &[]), "covoitapi:brand:findAll");
    }

    #[tokio::test]
    async fn test_hit_skips_source() {
        let mut mock = MockCacheBackend::new();
        let stored = serde_json::json!({"cached": true, "data": item()}).to_string();
        mock.expect_get()
            .withf(|key| key == "covoitapi:car:findById:1")
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));
        mock.expect_set().never();

        let calls = AtomicUsize::new(0);
        let result: Result<Item, ()> = aside(mock)
            .read(CacheDomain::Car, "findById", &[&1], || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(item())
            })
            .await;

        assert_eq!(result, Ok(item()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cached_null_is_a_hit() {
        let mut mock = MockCacheBackend::new();
        mock.expect_get()
            .returning(|_| Ok(Some(r#"{"cached":true,"data":null}"#.to_string())));
        mock.expect_set().never();

        let calls = AtomicUsize::new(0);
        let result: Result<Option<Item>, ()> = aside(mock)
            .read(CacheDomain::Car, "findById", &[&9], || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Some(item()))
            })
            .await;

        assert_eq!(result, Ok(None));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_miss_loads_and_stores_with_domain_ttl() {
        let mut mock = MockCacheBackend::new();
        mock.expect_get().times(1).returning(|_| Ok(None));
        mock.expect_set()
            .withf(|key, value, ttl| {
                key == "covoitapi:travel:findById:3"
                    && value.starts_with(r#"{"cached":true"#)
                    && *ttl == 60
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let calls = AtomicUsize::new(0);
        let result: Result<Item, ()> = aside(mock)
            .read(CacheDomain::Travel, "findById", &[&3], || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(item())
            })
            .await;

        assert_eq!(result, Ok(item()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_source_error_is_returned_and_not_cached() {
        let mut mock = MockCacheBackend::new();
        mock.expect_get().returning(|_| Ok(None));
        mock.expect_set().never();

        let result: Result<Item, &str> = aside(mock)
            .read(CacheDomain::Car, "findById", &[&1], || async { Err("db down") })
            .await;

        assert_eq!(result, Err("db down"));
    }

    #[tokio::test]
    async fn test_backend_errors_never_fail_the_read() {
        let mut mock = MockCacheBackend::new();
        mock.expect_get().returning(|_| Err(unavailable()));
        mock.expect_set().times(1).returning(|_, _, _| Err(unavailable()));

        let result: Result<Item, ()> = aside(mock)
            .read(CacheDomain::Car, "findById", &[&1], || async { Ok(item()) })
            .await;

        assert_eq!(result, Ok(item()));
    }

    #[tokio::test]
    async fn test_malformed_entry_is_a_miss() {
        for raw in ["not json", r#"{"cached":false,"data":null}"#, r#"{"id":1}"#, "null"] {
            let mut mock = MockCacheBackend::new();
            let raw = raw.to_string();
            mock.expect_get().returning(move |_| Ok(Some(raw.clone())));
            mock.expect_set().times(1).returning(|_, _, _| Ok(()));

            let calls = AtomicUsize::new(0);
            let result: Result<Item, ()> = aside(mock)
                .read(CacheDomain::Car, "findById", &[&1], || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(item())
                })
                .await;

            assert_eq!(result, Ok(item()));
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_failed_write_does_not_invalidate() {
        let mut mock = MockCacheBackend::new();
        mock.expect_delete_by_pattern().never();

        let result: Result<(), &str> = aside(mock)
            .write(CacheDomain::Car, async { Err("constraint violation") })
            .await;

        assert_eq!(result, Err("constraint violation"));
    }

    #[tokio::test]
    async fn test_successful_write_attempts_every_pattern() {
        let mut mock = MockCacheBackend::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        mock.expect_delete_by_pattern()
            .times(5)
            .returning(move |pattern| {
                recorder.lock().unwrap().push(pattern.to_string());
                if pattern == "covoitapi:user:*" {
                    Err(unavailable())
                } else {
                    Ok(1)
                }
            });

        let result: Result<i32, ()> = aside(mock).write(CacheDomain::Driver, async { Ok(7) }).await;
        assert_eq!(result, Ok(7));

        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                "covoitapi:car:*",
                "covoitapi:driver:*",
                "covoitapi:inscription:*",
                "covoitapi:travel:*",
                "covoitapi:user:*",
            ]
        );
    }

    #[tokio::test]
    async fn test_inscription_write_clears_two_domains() {
        let mut mock = MockCacheBackend::new();
        mock.expect_delete_by_pattern()
            .withf(|pattern| pattern == "covoitapi:inscription:*")
            .times(1)
            .returning(|_| Ok(0));
        mock.expect_delete_by_pattern()
            .withf(|pattern| pattern == "covoitapi:travel:*")
            .times(1)
            .returning(|_| Ok(0));

        let result: Result<(), ()> = aside(mock).write(CacheDomain::Inscription, async { Ok(()) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invalidate_domains_deduplicates_patterns() {
        let mut mock = MockCacheBackend::new();
        mock.expect_delete_by_pattern().times(6).returning(|_| Ok(0));

        aside(mock)
            .invalidate_domains(&[CacheDomain::User, CacheDomain::Auth, CacheDomain::Inscription])
            .await;
    }

    #[tokio::test]
    async fn test_disabled_cache_never_touches_backend() {
        let mut mock = MockCacheBackend::new();
        mock.expect_get().never();
        mock.expect_set().never();
        mock.expect_delete_by_pattern().never();
        let cache = CacheAside::new(Arc::new(mock), Arc::new(CacheConfig::disabled()));

        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let result: Result<Item, ()> = cache
                .read(CacheDomain::Car, "findById", &[&1], || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(item())
                })
                .await;
            assert_eq!(result, Ok(item()));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let written: Result<(), ()> = cache.write(CacheDomain::Car, async { Ok(()) }).await;
        assert!(written.is_ok());
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let store: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let mut mock = MockCacheBackend::new();

        let reader = Arc::clone(&store);
        mock.expect_get()
            .withf(|key| key == "covoitapi:car:findById:1")
            .times(2)
            .returning(move |_| Ok(reader.lock().unwrap().clone()));

        let writer = Arc::clone(&store);
        mock.expect_set()
            .withf(|key, _, ttl| key == "covoitapi:car:findById:1" && *ttl == 300)
            .times(1)
            .returning(move |_, value, _| {
                *writer.lock().unwrap() = Some(value);
                Ok(())
            });

        let cache = aside(mock);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let result: Result<Option<Item>, ()> = cache
                .read(CacheDomain::Car, "findById", &[&1], || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(item()))
                })
                .await;
            assert_eq!(result, Ok(Some(item())));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
