//! HTTP request handlers.

pub mod auth_handler;
pub mod car_handler;
pub mod catalog_handler;
pub mod city_handler;
pub mod driver_handler;
pub mod inscription_handler;
pub mod travel_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use car_handler::car_routes;
pub use catalog_handler::{brand_routes, color_routes, model_routes};
pub use city_handler::city_routes;
pub use driver_handler::driver_routes;
pub use inscription_handler::inscription_routes;
pub use travel_handler::{travel_routes, TravelResponse};
pub use user_handler::user_routes;
