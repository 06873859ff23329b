//! Car entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Car;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cars")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub immat: String,
    pub model_id: i32,
    pub color_id: i32,
    pub driver_id: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Car {
    fn from(model: Model) -> Self {
        Car {
            id: model.id,
            immat: model.immat,
            model_id: model.model_id,
            color_id: model.color_id,
            driver_id: model.driver_id,
            created_at: model.created_at,
        }
    }
}
