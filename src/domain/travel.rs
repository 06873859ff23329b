//! Travel (trip) entity: a driver offering seats between two cities.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Travel {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub kms: i32,
    pub available_seats: i32,
    /// Seats held by pending or accepted inscriptions
    pub booked_seats: i32,
    pub driver_id: i32,
    pub car_id: i32,
    pub departure_city_id: i32,
    pub arrival_city_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Travel {
    pub fn remaining_seats(&self) -> i32 {
        (self.available_seats - self.booked_seats).max(0)
    }

    pub fn is_full(&self) -> bool {
        self.remaining_seats() == 0
    }

    pub fn has_departed(&self, now: DateTime<Utc>) -> bool {
        self.date <= now
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTravel {
    pub date: DateTime<Utc>,
    pub kms: i32,
    pub available_seats: i32,
    pub driver_id: i32,
    pub car_id: i32,
    pub departure_city_id: i32,
    pub arrival_city_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TravelUpdate {
    pub date: Option<DateTime<Utc>>,
    pub kms: Option<i32>,
    pub available_seats: Option<i32>,
    pub car_id: Option<i32>,
}

/// Search criteria for travel listings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TravelFilters {
    pub departure_city_id: Option<i32>,
    pub arrival_city_id: Option<i32>,
    /// Day of departure (UTC)
    pub date: Option<NaiveDate>,
}

/// Cache-key rendering: absent criteria print as `-`
impl fmt::Display for TravelFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn part<T: fmt::Display>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string())
        }

        write!(
            f,
            "{}:{}:{}",
            part(&self.departure_city_id),
            part(&self.arrival_city_id),
            part(&self.date)
        )
    }
}
