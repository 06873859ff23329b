//! Passenger inscription on a travel.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InscriptionStatus {
    Pending,
    Accepted,
    Refused,
    Cancelled,
}

impl InscriptionStatus {
    /// Statuses that hold a seat
    pub const ACTIVE: [InscriptionStatus; 2] =
        [InscriptionStatus::Pending, InscriptionStatus::Accepted];

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InscriptionStatus::Pending => "PENDING",
            InscriptionStatus::Accepted => "ACCEPTED",
            InscriptionStatus::Refused => "REFUSED",
            InscriptionStatus::Cancelled => "CANCELLED",
        }
    }
}

impl From<&str> for InscriptionStatus {
    fn from(s: &str) -> Self {
        match s {
            "ACCEPTED" => InscriptionStatus::Accepted,
            "REFUSED" => InscriptionStatus::Refused,
            "CANCELLED" => InscriptionStatus::Cancelled,
            _ => InscriptionStatus::Pending,
        }
    }
}

impl fmt::Display for InscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inscription {
    pub id: i32,
    pub user_id: i32,
    pub travel_id: i32,
    pub status: InscriptionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInscription {
    pub user_id: i32,
    pub travel_id: i32,
}
