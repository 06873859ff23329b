//! Driver entity: a user allowed to offer travels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: i32,
    pub user_id: i32,
    pub driver_license: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDriver {
    pub user_id: i32,
    pub driver_license: String,
}
