//! Domain layer - carpooling entities and value objects.
//!
//! Plain data types shared by repositories, services and handlers.
//! Entities are `Serialize + Deserialize` so the cache layer can store them.

pub mod auth;
pub mod car;
pub mod catalog;
pub mod city;
pub mod driver;
pub mod inscription;
pub mod password;
pub mod role;
pub mod travel;
pub mod user;

pub use auth::{Account, Auth, NewAuth};
pub use car::{normalize_immat, Car, CarUpdate, NewCar};
pub use catalog::{Brand, Color, Model, NewColor, NewModel};
pub use city::{City, NewCity};
pub use driver::{Driver, NewDriver};
pub use inscription::{Inscription, InscriptionStatus, NewInscription};
pub use password::Password;
pub use role::Role;
pub use travel::{NewTravel, Travel, TravelFilters, TravelUpdate};
pub use user::{NewUser, ProfileResponse, User, UserResponse, UserUpdate};
