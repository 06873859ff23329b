//! Application configuration module
//!
//! Handles environment variables and application-wide constants.

mod cache;
mod constants;
mod settings;

pub use cache::{CacheConfig, CacheDomain};
pub use constants::*;
pub use settings::Config;
