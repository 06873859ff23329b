//! Centralized error handling.
//!
//! Repositories fail with [`DatabaseError`], services and handlers with
//! [`AppError`]. Every `AppError` carries a stable code which the
//! [`registry`] maps to an HTTP status and a category.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

pub mod registry;

pub use registry::{ErrorCategory, ErrorDescriptor};

/// Persisted resources, used to build `*_NOT_FOUND` / `*_ALREADY_EXISTS` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
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

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::User,
        Resource::Auth,
        Resource::Driver,
        Resource::Car,
        Resource::Brand,
        Resource::Model,
        Resource::Color,
        Resource::City,
        Resource::Travel,
        Resource::Inscription,
    ];

    /// Human readable name used in messages
    pub fn name(&self) -> &'static str {
        match self {
            Resource::User => "User",
            Resource::Auth => "Account",
            Resource::Driver => "Driver",
            Resource::Car => "Car",
            Resource::Brand => "Brand",
            Resource::Model => "Model",
            Resource::Color => "Color",
            Resource::City => "City",
            Resource::Travel => "Travel",
            Resource::Inscription => "Inscription",
        }
    }

    pub fn not_found_code(&self) -> &'static str {
        match self {
            Resource::User => "USER_NOT_FOUND",
            Resource::Auth => "AUTH_NOT_FOUND",
            Resource::Driver => "DRIVER_NOT_FOUND",
            Resource::Car => "CAR_NOT_FOUND",
            Resource::Brand => "BRAND_NOT_FOUND",
            Resource::Model => "MODEL_NOT_FOUND",
            Resource::Color => "COLOR_NOT_FOUND",
            Resource::City => "CITY_NOT_FOUND",
            Resource::Travel => "TRAVEL_NOT_FOUND",
            Resource::Inscription => "INSCRIPTION_NOT_FOUND",
        }
    }

    pub fn already_exists_code(&self) -> &'static str {
        match self {
            Resource::User => "USER_ALREADY_EXISTS",
            Resource::Auth => "AUTH_ALREADY_EXISTS",
            Resource::Driver => "DRIVER_ALREADY_EXISTS",
            Resource::Car => "CAR_ALREADY_EXISTS",
            Resource::Brand => "BRAND_ALREADY_EXISTS",
            Resource::Model => "MODEL_ALREADY_EXISTS",
            Resource::Color => "COLOR_ALREADY_EXISTS",
            Resource::City => "CITY_ALREADY_EXISTS",
            Resource::Travel => "TRAVEL_ALREADY_EXISTS",
            Resource::Inscription => "INSCRIPTION_ALREADY_EXISTS",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure of a primary repository call, wrapping the ORM error.
#[derive(Error, Debug)]
#[error("database operation `{operation}` failed: {source}")]
pub struct DatabaseError {
    pub operation: &'static str,
    #[source]
    pub source: DbErr,
}

impl DatabaseError {
    pub fn new(operation: &'static str, source: DbErr) -> Self {
        Self { operation, source }
    }
}

/// Result type returned by every repository method
pub type RepoResult<T> = Result<T, DatabaseError>;

/// Attach the repository operation name to an ORM result.
pub trait DbResultExt<T> {
    fn context(self, operation: &'static str) -> RepoResult<T>;
}

impl<T> DbResultExt<T> for Result<T, DbErr> {
    fn context(self, operation: &'static str) -> RepoResult<T> {
        self.map_err(|source| DatabaseError::new(operation, source))
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    TokenInvalid,

    // Resource errors
    #[error("{0} not found")]
    NotFound(Resource),

    #[error("{0} already exists")]
    AlreadyExists(Resource),

    // Validation
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Violation of a business rule, identified by its registry code
    #[error("{message}")]
    Rule {
        code: &'static str,
        message: String,
    },

    // Infrastructure
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Internal server error")]
    Internal(String),
}

/// Error envelope: `{success: false, error: {code, message, details?}}`
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl AppError {
    /// Stable error code for clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::TokenInvalid => "TOKEN_INVALID",
            AppError::NotFound(resource) => resource.not_found_code(),
            AppError::AlreadyExists(resource) => resource.already_exists_code(),
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::Rule { code, .. } => *code,
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Registry entry for this error (falls back to INTERNAL_ERROR)
    pub fn descriptor(&self) -> ErrorDescriptor {
        registry::describe(self.code())
    }

    /// HTTP status from the registry
    pub fn status(&self) -> StatusCode {
        self.descriptor().status
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!(operation = e.operation, error = ?e.source, "Database error");
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Validation { details, .. } => details.clone(),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let descriptor = self.descriptor();
        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: descriptor.code.to_string(),
                message: self.user_message(),
                details: self.details(),
            },
        };

        (descriptor.status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, resource: Resource) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, resource: Resource) -> AppResult<T> {
        self.ok_or(AppError::NotFound(resource))
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation {
            message: msg.into(),
            details: None,
        }
    }

    pub fn validation_with(msg: impl Into<String>, details: serde_json::Value) -> Self {
        AppError::Validation {
            message: msg.into(),
            details: Some(details),
        }
    }

    pub fn rule(code: &'static str, msg: impl Into<String>) -> Self {
        AppError::Rule {
            code,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_code_per_resource() {
        assert_eq!(AppError::NotFound(Resource::User).code(), "USER_NOT_FOUND");
        assert_eq!(AppError::NotFound(Resource::Travel).code(), "TRAVEL_NOT_FOUND");
        assert_eq!(
            AppError::AlreadyExists(Resource::Brand).code(),
            "BRAND_ALREADY_EXISTS"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound(Resource::Car).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::AlreadyExists(Resource::Car).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::validation("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_error_keeps_cause() {
        let err: AppError = DatabaseError::new("car.findById", DbErr::Custom("down".into())).into();
        assert_eq!(err.code(), "DATABASE_ERROR");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        match err {
            AppError::Database(e) => {
                assert_eq!(e.operation, "car.findById");
                assert!(matches!(e.source, DbErr::Custom(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unregistered_rule_code_renders_as_internal() {
        let response = AppError::rule("SOMETHING_NEW", "not registered").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<u8> = None;
        assert!(matches!(
            missing.ok_or_not_found(Resource::City),
            Err(AppError::NotFound(Resource::City))
        ));
    }
}
