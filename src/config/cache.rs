//! Cache settings: enable flag, key prefix, per-domain TTLs and the
//! invalidation patterns each domain clears on writes.

use std::collections::HashMap;
use std::env;
use std::fmt;

use super::constants::{
    CATALOG_CACHE_TTL_SECONDS, DEFAULT_CACHE_KEY_PREFIX, DEFAULT_CACHE_TTL_SECONDS,
    TRAVEL_CACHE_TTL_SECONDS,
};

/// Cache namespace of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheDomain {
    User,
    Auth,
    Driver,
    Car,
    Brand,
    Model,
    Color,
    City,
    Travel,
    Inscription,
}

impl CacheDomain {
    pub const ALL: [CacheDomain; 10] = [
        CacheDomain::User,
        CacheDomain::Auth,
        CacheDomain::Driver,
        CacheDomain::Car,
        CacheDomain::Brand,
        CacheDomain::Model,
        CacheDomain::Color,
        CacheDomain::City,
        CacheDomain::Travel,
        CacheDomain::Inscription,
    ];

    /// Key segment, e.g. `car` in `covoitapi:car:findById:1`
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheDomain::User => "user",
            CacheDomain::Auth => "auth",
            CacheDomain::Driver => "driver",
            CacheDomain::Car => "car",
            CacheDomain::Brand => "brand",
            CacheDomain::Model => "model",
            CacheDomain::Color => "color",
            CacheDomain::City => "city",
            CacheDomain::Travel => "travel",
            CacheDomain::Inscription => "inscription",
        }
    }

    /// Patterns (without prefix) cleared after a successful write in this
    /// domain: its own keys plus every domain whose cached reads embed data
    /// derived from it.
    pub fn invalidation_patterns(&self) -> &'static [&'static str] {
        match self {
            CacheDomain::User => &[
                "user:*",
                "auth:*",
                "driver:*",
                "car:*",
                "travel:*",
                "inscription:*",
            ],
            CacheDomain::Auth => &["auth:*", "user:*"],
            CacheDomain::Driver => &["driver:*", "user:*", "car:*", "travel:*", "inscription:*"],
            CacheDomain::Car => &["car:*", "travel:*"],
            CacheDomain::Brand => &["brand:*", "model:*", "car:*"],
            CacheDomain::Model => &["model:*", "car:*"],
            CacheDomain::Color => &["color:*", "car:*"],
            CacheDomain::City => &["city:*", "travel:*"],
            CacheDomain::Travel => &["travel:*", "inscription:*"],
            CacheDomain::Inscription => &["inscription:*", "travel:*"],
        }
    }

    fn default_ttl(&self) -> u64 {
        match self {
            CacheDomain::Brand | CacheDomain::Model | CacheDomain::Color | CacheDomain::City => {
                CATALOG_CACHE_TTL_SECONDS
            }
            CacheDomain::Travel | CacheDomain::Inscription => TRAVEL_CACHE_TTL_SECONDS,
            CacheDomain::User | CacheDomain::Auth | CacheDomain::Driver | CacheDomain::Car => {
                DEFAULT_CACHE_TTL_SECONDS
            }
        }
    }

    /// Environment variable holding this domain's TTL, e.g. `CACHE_TTL_CAR`
    pub fn ttl_env_var(&self) -> String {
        format!("CACHE_TTL_{}", self.as_str().to_uppercase())
    }
}

impl fmt::Display for CacheDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache configuration, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub key_prefix: String,
    ttl: HashMap<CacheDomain, u64>,
}

impl CacheConfig {
    /// Configuration with default TTLs for every domain.
    pub fn new(enabled: bool, key_prefix: impl Into<String>) -> Self {
        let ttl = CacheDomain::ALL
            .iter()
            .map(|domain| (*domain, domain.default_ttl()))
            .collect();

        Self {
            enabled,
            key_prefix: key_prefix.into(),
            ttl,
        }
    }

    /// Caching switched off; decorators call the primary repositories directly.
    pub fn disabled() -> Self {
        Self::new(false, DEFAULT_CACHE_KEY_PREFIX)
    }

    /// Load from `CACHE_ENABLED`, `CACHE_KEY_PREFIX` and `CACHE_TTL_<DOMAIN>`.
    pub fn from_env() -> Self {
        let enabled = env::var("CACHE_ENABLED")
            .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no" | "off"))
            .unwrap_or(true);
        let key_prefix =
            env::var("CACHE_KEY_PREFIX").unwrap_or_else(|_| DEFAULT_CACHE_KEY_PREFIX.to_string());

        let mut config = Self::new(enabled, key_prefix);
        for domain in CacheDomain::ALL {
            if let Some(seconds) = env::var(domain.ttl_env_var())
                .ok()
                .and_then(|v| v.parse().ok())
            {
                config.ttl.insert(domain, seconds);
            }
        }

        config
    }

    /// Override one domain's TTL
    pub fn with_ttl(mut self, domain: CacheDomain, seconds: u64) -> Self {
        self.ttl.insert(domain, seconds);
        self
    }

    /// TTL in seconds for entries of a domain
    pub fn ttl_for(&self, domain: CacheDomain) -> u64 {
        self.ttl
            .get(&domain)
            .copied()
            .unwrap_or(DEFAULT_CACHE_TTL_SECONDS)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(true, DEFAULT_CACHE_KEY_PREFIX)
    }
}
