//! Driver entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Driver;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "drivers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    #[sea_orm(unique)]
    pub driver_license: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Driver {
    fn from(model: Model) -> Self {
        Driver {
            id: model.id,
            user_id: model.user_id,
            driver_license: model.driver_license,
            created_at: model.created_at,
        }
    }
}
