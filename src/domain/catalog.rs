//! Reference data: car brands, models and colors.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: i32,
    pub name: String,
}

/// A car model belongs to one brand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: i32,
    pub name: String,
    pub brand_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewModel {
    pub name: String,
    pub brand_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub id: i32,
    pub name: String,
    /// `#RRGGBB`
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewColor {
    pub name: String,
    pub hex: String,
}
