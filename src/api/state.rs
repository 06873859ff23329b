//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{CacheAside, Database};
use crate::services::{ServiceContainer, Services};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Use-cases
    pub services: Arc<dyn ServiceContainer>,
    /// Cache, probed by the health check
    pub cache: CacheAside,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Wire the services onto the database and cache.
    pub fn from_config(database: Arc<Database>, cache: CacheAside, config: Config) -> Self {
        let services = Arc::new(Services::from_connection(
            database.get_connection(),
            cache.clone(),
            config,
        ));

        Self::new(services, cache, database)
    }

    /// Create application state with manually injected services.
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        cache: CacheAside,
        database: Arc<Database>,
    ) -> Self {
        Self {
            services,
            cache,
            database,
        }
    }
}
