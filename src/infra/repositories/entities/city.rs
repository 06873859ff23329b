//! City entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::City;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub zipcode: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for City {
    fn from(model: Model) -> Self {
        City {
            id: model.id,
            name: model.name,
            zipcode: model.zipcode,
        }
    }
}
