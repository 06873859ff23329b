//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod auth;
pub mod brand;
pub mod car;
pub mod city;
pub mod color;
pub mod driver;
pub mod inscription;
pub mod model;
pub mod travel;
pub mod user;
