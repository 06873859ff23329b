//! Account roles, ordered `USER < DRIVER < ADMIN`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ROLE_ADMIN, ROLE_DRIVER, ROLE_USER};

/// Role attached to an account. Declaration order defines the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Driver,
    Admin,
}

impl Role {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// A role grants access to everything a lower role can reach
    pub fn can_access(&self, required: Role) -> bool {
        *self >= required
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Driver => ROLE_DRIVER,
            Role::Admin => ROLE_ADMIN,
        }
    }
}

/// Unknown stored values degrade to the least privileged role
impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => Role::Admin,
            ROLE_DRIVER => Role::Driver,
            _ => Role::User,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
