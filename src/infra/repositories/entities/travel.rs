//! Travel entity for SeaORM.
//!
//! Booked seats are not stored; the repository counts active inscriptions.

use sea_orm::entity::prelude::*;

use crate::domain::Travel;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "travels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: DateTimeUtc,
    pub kms: i32,
    pub available_seats: i32,
    pub driver_id: i32,
    pub car_id: i32,
    pub departure_city_id: i32,
    pub arrival_city_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain entity with the number of seats taken
    pub fn into_domain(self, booked_seats: i32) -> Travel {
        Travel {
            id: self.id,
            date: self.date,
            kms: self.kms,
            available_seats: self.available_seats,
            booked_seats,
            driver_id: self.driver_id,
            car_id: self.car_id,
            departure_city_id: self.departure_city_id,
            arrival_city_id: self.arrival_city_id,
            created_at: self.created_at,
        }
    }
}
