//! Service Container - Centralized service access.
//!
//! Handlers reach every use-case through [`ServiceContainer`]; the
//! concrete [`Services`] wires all services onto one shared Unit of Work.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, CarManager, CarService, CatalogManager, CatalogService,
    CityManager, CityService, DriverManager, DriverService, InscriptionManager,
    InscriptionService, TravelManager, TravelService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{CacheAside, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;
    fn users(&self) -> Arc<dyn UserService>;
    fn drivers(&self) -> Arc<dyn DriverService>;
    fn catalog(&self) -> Arc<dyn CatalogService>;
    fn cities(&self) -> Arc<dyn CityService>;
    fn cars(&self) -> Arc<dyn CarService>;
    fn travels(&self) -> Arc<dyn TravelService>;
    fn inscriptions(&self) -> Arc<dyn InscriptionService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth: Arc<dyn AuthService>,
    users: Arc<dyn UserService>,
    drivers: Arc<dyn DriverService>,
    catalog: Arc<dyn CatalogService>,
    cities: Arc<dyn CityService>,
    cars: Arc<dyn CarService>,
    travels: Arc<dyn TravelService>,
    inscriptions: Arc<dyn InscriptionService>,
}

impl Services {
    /// Create service container from database connection, cache and config
    pub fn from_connection(
        db: impl Into<Arc<sea_orm::DatabaseConnection>>,
        cache: CacheAside,
        config: Config,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db, cache));

        Self {
            auth: Arc::new(Authenticator::new(uow.clone(), config)),
            users: Arc::new(UserManager::new(uow.clone())),
            drivers: Arc::new(DriverManager::new(uow.clone())),
            catalog: Arc::new(CatalogManager::new(uow.clone())),
            cities: Arc::new(CityManager::new(uow.clone())),
            cars: Arc::new(CarManager::new(uow.clone())),
            travels: Arc::new(TravelManager::new(uow.clone())),
            inscriptions: Arc::new(InscriptionManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.users.clone()
    }

    fn drivers(&self) -> Arc<dyn DriverService> {
        self.drivers.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog.clone()
    }

    fn cities(&self) -> Arc<dyn CityService> {
        self.cities.clone()
    }

    fn cars(&self) -> Arc<dyn CarService> {
        self.cars.clone()
    }

    fn travels(&self) -> Arc<dyn TravelService> {
        self.travels.clone()
    }

    fn inscriptions(&self) -> Arc<dyn InscriptionService> {
        self.inscriptions.clone()
    }
}
