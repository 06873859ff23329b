//! Unit-of-work double for service tests: mockall repositories plus a
//! sea-orm mock connection for the transactional paths.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

use crate::domain::{Auth, Car, Driver, Inscription, InscriptionStatus, Role, Travel, User};
use crate::errors::AppResult;
use crate::infra::cache::CacheAside;
use crate::infra::repositories::*;
use crate::infra::{run_transaction, TransactionContext, TxFuture, UnitOfWork};

/// Mock repositories, one per entity. Unused mocks panic when called.
#[derive(Default)]
pub(crate) struct MockRepos {
    pub users: MockUserRepository,
    pub auths: MockAuthRepository,
    pub drivers: MockDriverRepository,
    pub cars: MockCarRepository,
    pub brands: MockBrandRepository,
    pub models: MockModelRepository,
    pub colors: MockColorRepository,
    pub cities: MockCityRepository,
    pub travels: MockTravelRepository,
    pub inscriptions: MockInscriptionRepository,
}

impl MockRepos {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit of work with an empty mock connection
    pub fn into_uow(self) -> Arc<TestUnitOfWork> {
        self.into_uow_with_db(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    pub fn into_uow_with_db(self, db: impl Into<Arc<DatabaseConnection>>) -> Arc<TestUnitOfWork> {
        Arc::new(TestUnitOfWork {
            users: Arc::new(self.users),
            auths: Arc::new(self.auths),
            drivers: Arc::new(self.drivers),
            cars: Arc::new(self.cars),
            brands: Arc::new(self.brands),
            models: Arc::new(self.models),
            colors: Arc::new(self.colors),
            cities: Arc::new(self.cities),
            travels: Arc::new(self.travels),
            inscriptions: Arc::new(self.inscriptions),
            cache: CacheAside::disabled(),
            db: db.into(),
        })
    }
}

pub(crate) struct TestUnitOfWork {
    users: Arc<dyn UserRepository>,
    auths: Arc<dyn AuthRepository>,
    drivers: Arc<dyn DriverRepository>,
    cars: Arc<dyn CarRepository>,
    brands: Arc<dyn BrandRepository>,
    models: Arc<dyn ModelRepository>,
    colors: Arc<dyn ColorRepository>,
    cities: Arc<dyn CityRepository>,
    travels: Arc<dyn TravelRepository>,
    inscriptions: Arc<dyn InscriptionRepository>,
    cache: CacheAside,
    db: Arc<DatabaseConnection>,
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn auths(&self) -> Arc<dyn AuthRepository> {
        self.auths.clone()
    }

    fn drivers(&self) -> Arc<dyn DriverRepository> {
        self.drivers.clone()
    }

    fn cars(&self) -> Arc<dyn CarRepository> {
        self.cars.clone()
    }

    fn brands(&self) -> Arc<dyn BrandRepository> {
        self.brands.clone()
    }

    fn models(&self) -> Arc<dyn ModelRepository> {
        self.models.clone()
    }

    fn colors(&self) -> Arc<dyn ColorRepository> {
        self.colors.clone()
    }

    fn cities(&self) -> Arc<dyn CityRepository> {
        self.cities.clone()
    }

    fn travels(&self) -> Arc<dyn TravelRepository> {
        self.travels.clone()
    }

    fn inscriptions(&self) -> Arc<dyn InscriptionRepository> {
        self.inscriptions.clone()
    }

    fn cache(&self) -> &CacheAside {
        &self.cache
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        run_transaction(self.db.as_ref(), f).await
    }
}

// Fixtures

pub(crate) fn user(id: i32) -> User {
    User {
        id,
        firstname: "Ada".to_string(),
        lastname: "Lovelace".to_string(),
        phone: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        anonymized_at: None,
    }
}

pub(crate) fn auth(user_id: i32, role: Role, password_hash: &str) -> Auth {
    Auth {
        id: user_id,
        user_id,
        email: format!("user{}@example.com", user_id),
        password_hash: password_hash.to_string(),
        role,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub(crate) fn driver(id: i32, user_id: i32) -> Driver {
    Driver {
        id,
        user_id,
        driver_license: format!("LIC-{}", id),
        created_at: Utc::now(),
    }
}

pub(crate) fn car(id: i32, driver_id: i32) -> Car {
    Car {
        id,
        immat: "AB-123-CD".to_string(),
        model_id: 1,
        color_id: 1,
        driver_id,
        created_at: Utc::now(),
    }
}

/// Travel departing tomorrow
pub(crate) fn travel(id: i32, driver_id: i32, available: i32, booked: i32) -> Travel {
    Travel {
        id,
        date: Utc::now() + Duration::days(1),
        kms: 120,
        available_seats: available,
        booked_seats: booked,
        driver_id,
        car_id: 1,
        departure_city_id: 1,
        arrival_city_id: 2,
        created_at: Utc::now(),
    }
}

pub(crate) fn inscription(id: i32, user_id: i32, travel_id: i32) -> Inscription {
    Inscription {
        id,
        user_id,
        travel_id,
        status: InscriptionStatus::Pending,
        created_at: Utc::now(),
    }
}
