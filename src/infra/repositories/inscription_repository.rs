//! Inscription repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::inscription::{self, ActiveModel, Entity as InscriptionEntity};
use crate::domain::{Inscription, InscriptionStatus, NewInscription};
use crate::errors::{DbResultExt, RepoResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

fn active_statuses() -> Vec<&'static str> {
    InscriptionStatus::ACTIVE
        .iter()
        .map(InscriptionStatus::as_str)
        .collect()
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait InscriptionRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Inscription>>;

    /// Every inscription of a passenger, newest first
    async fn find_by_user(&self, user_id: i32) -> RepoResult<Vec<Inscription>>;

    async fn find_by_travel(&self, travel_id: i32) -> RepoResult<Vec<Inscription>>;

    /// Standing (pending or accepted) inscription of a user on a travel
    async fn find_by_user_and_travel(
        &self,
        user_id: i32,
        travel_id: i32,
    ) -> RepoResult<Option<Inscription>>;

    /// Seats held on a travel
    async fn count_active_by_travel(&self, travel_id: i32) -> RepoResult<u64>;

    async fn create(&self, inscription: NewInscription) -> RepoResult<Inscription>;

    async fn update_status(
        &self,
        id: i32,
        status: InscriptionStatus,
    ) -> RepoResult<Option<Inscription>>;
}

pub struct InscriptionStore {
    db: Arc<DatabaseConnection>,
}

impl InscriptionStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InscriptionRepository for InscriptionStore {
    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Inscription>> {
        let result = InscriptionEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("inscription.findById")?;

        Ok(result.map(Inscription::from))
    }

    async fn find_by_user(&self, user_id: i32) -> RepoResult<Vec<Inscription>> {
        let models = InscriptionEntity::find()
            .filter(inscription::Column::UserId.eq(user_id))
            .order_by_desc(inscription::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .context("inscription.findByUser")?;

        Ok(models.into_iter().map(Inscription::from).collect())
    }

    async fn find_by_travel(&self, travel_id: i32) -> RepoResult<Vec<Inscription>> {
        let models = InscriptionEntity::find()
            .filter(inscription::Column::TravelId.eq(travel_id))
            .order_by_asc(inscription::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .context("inscription.findByTravel")?;

        Ok(models.into_iter().map(Inscription::from).collect())
    }

    async fn find_by_user_and_travel(
        &self,
        user_id: i32,
        travel_id: i32,
    ) -> RepoResult<Option<Inscription>> {
        let result = InscriptionEntity::find()
            .filter(inscription::Column::UserId.eq(user_id))
            .filter(inscription::Column::TravelId.eq(travel_id))
            .filter(inscription::Column::Status.is_in(active_statuses()))
            .one(self.db.as_ref())
            .await
            .context("inscription.findByUserAndTravel")?;

        Ok(result.map(Inscription::from))
    }

    async fn count_active_by_travel(&self, travel_id: i32) -> RepoResult<u64> {
        InscriptionEntity::find()
            .filter(inscription::Column::TravelId.eq(travel_id))
            .filter(inscription::Column::Status.is_in(active_statuses()))
            .count(self.db.as_ref())
            .await
            .context("inscription.countActiveByTravel")
    }

    async fn create(&self, new_inscription: NewInscription) -> RepoResult<Inscription> {
        let active_model = ActiveModel {
            id: NotSet,
            user_id: Set(new_inscription.user_id),
            travel_id: Set(new_inscription.travel_id),
            status: Set(InscriptionStatus::Pending.as_str().to_string()),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model
            .insert(self.db.as_ref())
            .await
            .context("inscription.create")?;
        Ok(Inscription::from(model))
    }

    async fn update_status(
        &self,
        id: i32,
        status: InscriptionStatus,
    ) -> RepoResult<Option<Inscription>> {
        let Some(existing) = InscriptionEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("inscription.updateStatus")?
        else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());

        let model = active
            .update(self.db.as_ref())
            .await
            .context("inscription.updateStatus")?;
        Ok(Some(Inscription::from(model)))
    }
}
