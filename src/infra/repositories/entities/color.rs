//! Car color entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Color;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "colors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub hex: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Color {
    fn from(model: Model) -> Self {
        Color {
            id: model.id,
            name: model.name,
            hex: model.hex,
        }
    }
}
