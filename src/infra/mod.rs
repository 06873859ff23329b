//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and sea-orm repositories
//! - Redis cache backend and the cache-aside decorators
//! - Unit of Work for transaction management

pub mod cache;
pub mod cached;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{CacheAside, CacheBackend, CacheError, NoopCache, RedisCache};
pub use db::{Database, Migrator};
pub use repositories::{
    AuthRepository, BrandRepository, CarRepository, CityRepository, ColorRepository,
    DriverRepository, InscriptionRepository, ModelRepository, TravelRepository, UserRepository,
};
pub use unit_of_work::{
    run_transaction, Persistence, TransactionContext, TxAuthRepository, TxDriverRepository,
    TxFuture, TxInscriptionRepository, TxUserRepository, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockCacheBackend;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockAuthRepository, MockBrandRepository, MockCarRepository, MockCityRepository,
    MockColorRepository, MockDriverRepository, MockInscriptionRepository, MockModelRepository,
    MockTravelRepository, MockUserRepository,
};
