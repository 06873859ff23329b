//! Cache-aside decorators over the primary repositories.
//!
//! Each `Cached*Repository` implements the same trait as the store it
//! wraps. Reads are keyed `{prefix}{domain}:{method}:{args}` and go through
//! [`CacheAside::read`](crate::infra::cache::CacheAside::read); writes
//! clear the domain's invalidation patterns once they succeed.

mod accounts;
mod catalog;
mod trips;

pub use accounts::{CachedAuthRepository, CachedDriverRepository, CachedUserRepository};
pub use catalog::{
    CachedBrandRepository, CachedCityRepository, CachedColorRepository, CachedModelRepository,
};
pub use trips::{CachedCarRepository, CachedInscriptionRepository, CachedTravelRepository};
