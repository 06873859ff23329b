//! Account credentials (email, password hash, role) bound to a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

/// Stored credentials, never returned to clients as-is.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Auth {
    pub id: i32,
    pub user_id: i32,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Don't expose the hash in debug output
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Credentials without the password hash. This is the only form of
/// account data written to the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i32,
    pub user_id: i32,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Auth> for Account {
    fn from(auth: Auth) -> Self {
        Self {
            id: auth.id,
            user_id: auth.user_id,
            email: auth.email,
            role: auth.role,
            created_at: auth.created_at,
            updated_at: auth.updated_at,
        }
    }
}

/// Data needed to insert credentials
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuth {
    pub user_id: i32,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}
