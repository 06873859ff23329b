//! Error code registry.
//!
//! Maps every error code the API can emit to an HTTP status and a
//! category. Codes missing from the registry are rendered as
//! `500 INTERNAL_ERROR`.

use std::collections::HashMap;

use axum::http::StatusCode;
use once_cell::sync::Lazy;

use super::Resource;

/// Broad family an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Business rule or resource state (4xx)
    Domain,
    /// Authentication / authorization (401/403)
    Auth,
    /// Database, cache or other infrastructure (5xx)
    Infrastructure,
}

/// Registry entry for one error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub code: &'static str,
    pub status: StatusCode,
    pub category: ErrorCategory,
}

pub const INTERNAL_ERROR: ErrorDescriptor = ErrorDescriptor {
    code: "INTERNAL_ERROR",
    status: StatusCode::INTERNAL_SERVER_ERROR,
    category: ErrorCategory::Infrastructure,
};

// Business-rule codes raised through `AppError::rule`
pub const NO_SEATS_AVAILABLE: &str = "NO_SEATS_AVAILABLE";
pub const SELF_INSCRIPTION: &str = "SELF_INSCRIPTION";
pub const INVALID_TRAVEL: &str = "INVALID_TRAVEL";
pub const NOT_A_DRIVER: &str = "NOT_A_DRIVER";
pub const INSCRIPTION_CLOSED: &str = "INSCRIPTION_CLOSED";

const STATIC_ENTRIES: &[(&str, StatusCode, ErrorCategory)] = &[
    ("UNAUTHORIZED", StatusCode::UNAUTHORIZED, ErrorCategory::Auth),
    ("INVALID_CREDENTIALS", StatusCode::UNAUTHORIZED, ErrorCategory::Auth),
    ("TOKEN_EXPIRED", StatusCode::UNAUTHORIZED, ErrorCategory::Auth),
    ("TOKEN_INVALID", StatusCode::UNAUTHORIZED, ErrorCategory::Auth),
    ("FORBIDDEN", StatusCode::FORBIDDEN, ErrorCategory::Auth),
    (NOT_A_DRIVER, StatusCode::FORBIDDEN, ErrorCategory::Auth),
    ("VALIDATION_ERROR", StatusCode::BAD_REQUEST, ErrorCategory::Domain),
    (SELF_INSCRIPTION, StatusCode::BAD_REQUEST, ErrorCategory::Domain),
    (INVALID_TRAVEL, StatusCode::BAD_REQUEST, ErrorCategory::Domain),
    (NO_SEATS_AVAILABLE, StatusCode::CONFLICT, ErrorCategory::Domain),
    (INSCRIPTION_CLOSED, StatusCode::CONFLICT, ErrorCategory::Domain),
    ("DATABASE_ERROR", StatusCode::INTERNAL_SERVER_ERROR, ErrorCategory::Infrastructure),
    ("CACHE_ERROR", StatusCode::INTERNAL_SERVER_ERROR, ErrorCategory::Infrastructure),
    ("EXTERNAL_SERVICE_ERROR", StatusCode::BAD_GATEWAY, ErrorCategory::Infrastructure),
    ("INTERNAL_ERROR", StatusCode::INTERNAL_SERVER_ERROR, ErrorCategory::Infrastructure),
];

static REGISTRY: Lazy<HashMap<&'static str, ErrorDescriptor>> = Lazy::new(|| {
    let mut map = HashMap::new();

    for &(code, status, category) in STATIC_ENTRIES {
        map.insert(code, ErrorDescriptor { code, status, category });
    }

    for resource in Resource::ALL {
        let not_found = resource.not_found_code();
        map.insert(
            not_found,
            ErrorDescriptor {
                code: not_found,
                status: StatusCode::NOT_FOUND,
                category: ErrorCategory::Domain,
            },
        );

        let exists = resource.already_exists_code();
        map.insert(
            exists,
            ErrorDescriptor {
                code: exists,
                status: StatusCode::CONFLICT,
                category: ErrorCategory::Domain,
            },
        );
    }

    map
});

/// Look up a code, defaulting to `INTERNAL_ERROR`.
pub fn describe(code: &str) -> ErrorDescriptor {
    REGISTRY.get(code).copied().unwrap_or(INTERNAL_ERROR)
}

/// Whether the registry knows this code
pub fn is_registered(code: &str) -> bool {
    REGISTRY.contains_key(code)
}
