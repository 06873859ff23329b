//! Repository layer - Data access abstraction
//!
//! One trait per entity plus its sea-orm backed store. Every method
//! returns [`RepoResult`](crate::errors::RepoResult).

mod auth_repository;
mod base;
mod brand_repository;
mod car_repository;
mod city_repository;
mod color_repository;
mod driver_repository;
pub mod entities;
mod inscription_repository;
mod model_repository;
mod travel_repository;
mod user_repository;

pub use auth_repository::{AuthRepository, AuthStore};
pub use brand_repository::{BrandRepository, BrandStore};
pub use car_repository::{CarRepository, CarStore};
pub use city_repository::{CityRepository, CityStore};
pub use color_repository::{ColorRepository, ColorStore};
pub use driver_repository::{DriverRepository, DriverStore};
pub use inscription_repository::{InscriptionRepository, InscriptionStore};
pub use model_repository::{ModelRepository, ModelStore};
pub use travel_repository::{TravelRepository, TravelStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use auth_repository::MockAuthRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use brand_repository::MockBrandRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use car_repository::MockCarRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use city_repository::MockCityRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use color_repository::MockColorRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use driver_repository::MockDriverRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use inscription_repository::MockInscriptionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use model_repository::MockModelRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use travel_repository::MockTravelRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
