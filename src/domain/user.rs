//! User profile entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile. Credentials live in [`super::Auth`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// GDPR sentinel: set once the profile has been scrubbed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymized_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if the profile was anonymized
    pub fn is_anonymized(&self) -> bool {
        self.anonymized_at.is_some()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

/// Data needed to insert a profile
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub phone: Option<String>,
}

/// Partial profile update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub phone: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.firstname.is_none() && self.lastname.is_none() && self.phone.is_none()
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            firstname: user.firstname,
            lastname: user.lastname,
            phone: user.phone,
            created_at: user.created_at,
        }
    }
}

/// Profile of the authenticated user, joined with the account
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub email: String,
    pub role: super::Role,
}
