//! City entity used as travel departure/arrival.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i32,
    pub name: String,
    pub zipcode: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCity {
    pub name: String,
    pub zipcode: String,
}
