//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain rules and the Unit of Work. They depend on
//! repository traits only, and each exposes a trait so handlers can hold
//! `Arc<dyn ...Service>`.
//!
//! Writes that run inside a transaction bypass the cache decorators, so
//! those use-cases invalidate the touched cache domains after commit.

mod auth_service;
mod car_service;
mod catalog_service;
mod city_service;
pub mod container;
mod driver_service;
mod inscription_service;
mod travel_service;
mod user_service;

#[cfg(test)]
pub(crate) mod testing;

use crate::domain::Role;
use crate::errors::{AppError, AppResult};

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, Registration, TokenResponse};
pub use car_service::{CarInput, CarManager, CarService};
pub use catalog_service::{CatalogManager, CatalogService};
pub use city_service::{CityManager, CityService};
pub use driver_service::{DriverManager, DriverService};
pub use inscription_service::{InscriptionManager, InscriptionService};
pub use travel_service::{TravelInput, TravelManager, TravelService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;

/// Authenticated caller on whose behalf a use-case runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Allow the call when the actor is the owner or an admin
    pub fn ensure_owner_or_admin(&self, owner_user_id: i32) -> AppResult<()> {
        if self.is_admin() || self.user_id == owner_user_id {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_or_admin() {
        assert!(Actor::new(1, Role::User).ensure_owner_or_admin(1).is_ok());
        assert!(Actor::new(2, Role::Admin).ensure_owner_or_admin(1).is_ok());
        assert!(matches!(
            Actor::new(2, Role::Driver).ensure_owner_or_admin(1),
            Err(AppError::Forbidden)
        ));
    }
}
