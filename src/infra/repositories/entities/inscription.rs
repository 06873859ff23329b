//! Inscription entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Inscription, InscriptionStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "inscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub travel_id: i32,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Inscription {
    fn from(model: Model) -> Self {
        Inscription {
            id: model.id,
            user_id: model.user_id,
            travel_id: model.travel_id,
            status: InscriptionStatus::from(model.status.as_str()),
            created_at: model.created_at,
        }
    }
}
