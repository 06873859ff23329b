//! Cache-aside behaviour of the repository layer, end to end.
//!
//! The repositories run on a sea-orm mock connection and cache into an
//! in-memory backend. A mock connection fails once its queued results are
//! used up, so a read that reaches the database twice shows up as an error.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

use covoit_api::config::{CacheConfig, Config};
use covoit_api::infra::cache::CacheResult;
use covoit_api::infra::repositories::entities::city;
use covoit_api::infra::{CacheAside, CacheBackend, Persistence, UnitOfWork};
use covoit_api::services::{ServiceContainer, Services};

const PREFIX: &str = "test:";

/// HashMap backend understanding trailing-`*` patterns
#[derive(Default)]
struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    fn insert(&self, key: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), "null".to_string());
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String, _ttl_seconds: u64) -> CacheResult<()> {
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn delete_by_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        match pattern.strip_suffix('*') {
            Some(prefix) => entries.retain(|key, _| !key.starts_with(prefix)),
            None => {
                entries.remove(pattern);
            }
        }
        Ok((before - entries.len()) as u64)
    }

    async fn is_healthy(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

fn cache_over(backend: Arc<MemoryCache>) -> CacheAside {
    CacheAside::new(backend, Arc::new(CacheConfig::new(true, PREFIX)))
}

fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

fn lyon() -> city::Model {
    city::Model {
        id: 1,
        name: "Lyon".to_string(),
        zipcode: "69001".to_string(),
    }
}

#[tokio::test]
async fn test_second_read_is_served_from_cache() {
    let backend = Arc::new(MemoryCache::default());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![lyon()]])
        .into_connection();
    let persistence = Persistence::new(db, cache_over(backend.clone()));

    let first = persistence.cities().find_all().await.expect("loaded");
    let second = persistence.cities().find_all().await.expect("cached");

    assert_eq!(first, second);
    assert_eq!(second[0].name, "Lyon");
    assert!(backend.contains("test:city:findAll"));
}

#[tokio::test]
async fn test_absent_rows_are_cached_too() {
    let backend = Arc::new(MemoryCache::default());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<city::Model>::new()])
        .into_connection();
    let persistence = Persistence::new(db, cache_over(backend.clone()));

    assert!(persistence.cities().find_by_id(9).await.expect("loaded").is_none());
    assert!(persistence.cities().find_by_id(9).await.expect("cached").is_none());
    assert!(backend.contains("test:city:findById:9"));
}

#[tokio::test]
async fn test_write_clears_dependent_domains_only() {
    let backend = Arc::new(MemoryCache::default());
    backend.insert("test:city:findAll");
    backend.insert("test:travel:findById:4");
    backend.insert("test:car:findById:2");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(1)])
        .into_connection();
    let persistence = Persistence::new(db, cache_over(backend.clone()));

    assert!(persistence.cities().delete(1).await.expect("deleted"));

    assert!(!backend.contains("test:city:findAll"));
    assert!(!backend.contains("test:travel:findById:4"));
    assert!(backend.contains("test:car:findById:2"));
}

#[tokio::test]
async fn test_user_delete_clears_cascaded_trip_data() {
    let backend = Arc::new(MemoryCache::default());
    for key in [
        "test:travel:findById:4",
        "test:car:findById:2",
        "test:inscription:findByUser:1",
        "test:city:findAll",
    ] {
        backend.insert(key);
    }
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(1)])
        .into_connection();
    let persistence = Persistence::new(db, cache_over(backend.clone()));

    assert!(persistence.users().delete(1).await.expect("deleted"));

    assert!(!backend.contains("test:travel:findById:4"));
    assert!(!backend.contains("test:car:findById:2"));
    assert!(!backend.contains("test:inscription:findByUser:1"));
    assert!(backend.contains("test:city:findAll"));
}

#[tokio::test]
async fn test_driver_delete_clears_inscriptions() {
    let backend = Arc::new(MemoryCache::default());
    backend.insert("test:inscription:findByTravel:4");
    backend.insert("test:brand:findAll");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(1)])
        .into_connection();
    let persistence = Persistence::new(db, cache_over(backend.clone()));

    assert!(persistence.drivers().delete(3).await.expect("deleted"));

    assert!(!backend.contains("test:inscription:findByTravel:4"));
    assert!(backend.contains("test:brand:findAll"));
}

#[tokio::test]
async fn test_failed_write_keeps_cache() {
    let backend = Arc::new(MemoryCache::default());
    backend.insert("test:city:findAll");
    // No exec result queued: the delete fails
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let persistence = Persistence::new(db, cache_over(backend.clone()));

    assert!(persistence.cities().delete(1).await.is_err());
    assert!(backend.contains("test:city:findAll"));
}

#[tokio::test]
async fn test_anonymization_clears_account_domains_after_commit() {
    let backend = Arc::new(MemoryCache::default());
    for key in [
        "test:user:findById:1",
        "test:auth:findAccount:1",
        "test:driver:findByUserId:1",
        "test:inscription:findByUser:1",
        "test:city:findAll",
    ] {
        backend.insert(key);
    }
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(1), exec(1), exec(1), exec(2)])
        .into_connection();
    let config = Config::new("postgres://localhost/test", "integration-secret-at-least-32-chars")
        .expect("valid test config");
    let services = Services::from_connection(db, cache_over(backend.clone()), config);

    services.users().anonymize_user(1).await.expect("anonymized");

    assert!(!backend.contains("test:user:findById:1"));
    assert!(!backend.contains("test:auth:findAccount:1"));
    assert!(!backend.contains("test:driver:findByUserId:1"));
    assert!(!backend.contains("test:inscription:findByUser:1"));
    assert!(backend.contains("test:city:findAll"));
}

#[tokio::test]
async fn test_failed_anonymization_leaves_cache_alone() {
    let backend = Arc::new(MemoryCache::default());
    backend.insert("test:user:findById:1");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(0)])
        .into_connection();
    let config = Config::new("postgres://localhost/test", "integration-secret-at-least-32-chars")
        .expect("valid test config");
    let services = Services::from_connection(db, cache_over(backend.clone()), config);

    assert!(services.users().anonymize_user(1).await.is_err());
    assert!(backend.contains("test:user:findById:1"));
}
