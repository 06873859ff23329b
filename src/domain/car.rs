//! Car entity owned by a driver.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::IMMAT_PATTERN;

static IMMAT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(IMMAT_PATTERN).expect("plate pattern is a valid regex"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: i32,
    /// Registration plate, `AB-123-CD`
    pub immat: String,
    pub model_id: i32,
    pub color_id: i32,
    pub driver_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Car {
    pub fn is_owned_by(&self, driver_id: i32) -> bool {
        self.driver_id == driver_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCar {
    pub immat: String,
    pub model_id: i32,
    pub color_id: i32,
    pub driver_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarUpdate {
    pub immat: Option<String>,
    pub model_id: Option<i32>,
    pub color_id: Option<i32>,
}

/// Normalize a plate (uppercase, trimmed) and check its format.
pub fn normalize_immat(raw: &str) -> Option<String> {
    let immat = raw.trim().to_uppercase();
    IMMAT_REGEX.is_match(&immat).then_some(immat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_immat() {
        assert_eq!(normalize_immat(" ab-123-cd "), Some("AB-123-CD".to_string()));
        assert_eq!(normalize_immat("AB123CD"), None);
        assert_eq!(normalize_immat("A-123-CD"), None);
    }
}
