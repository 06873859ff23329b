//! Driver repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::base::fetch_page;
use super::entities::driver::{self, ActiveModel, Entity as DriverEntity};
use crate::domain::{Driver, NewDriver};
use crate::errors::{DbResultExt, RepoResult};
use crate::types::{Page, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn find_all(&self, params: &PaginationParams) -> RepoResult<Page<Driver>>;

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Driver>>;

    /// Driver profile of a user
    async fn find_by_user_id(&self, user_id: i32) -> RepoResult<Option<Driver>>;

    async fn exists_by_license(&self, driver_license: &str) -> RepoResult<bool>;

    async fn create(&self, driver: NewDriver) -> RepoResult<Driver>;

    async fn update_license(&self, id: i32, driver_license: String)
        -> RepoResult<Option<Driver>>;

    async fn delete(&self, id: i32) -> RepoResult<bool>;
}

pub struct DriverStore {
    db: Arc<DatabaseConnection>,
}

impl DriverStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DriverRepository for DriverStore {
    async fn find_all(&self, params: &PaginationParams) -> RepoResult<Page<Driver>> {
        let query = DriverEntity::find().order_by_asc(driver::Column::Id);
        let page = fetch_page(query, self.db.as_ref(), params, "driver.findAll").await?;
        Ok(page.map(Driver::from))
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Driver>> {
        let result = DriverEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("driver.findById")?;

        Ok(result.map(Driver::from))
    }

    async fn find_by_user_id(&self, user_id: i32) -> RepoResult<Option<Driver>> {
        let result = DriverEntity::find()
            .filter(driver::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .context("driver.findByUserId")?;

        Ok(result.map(Driver::from))
    }

    async fn exists_by_license(&self, driver_license: &str) -> RepoResult<bool> {
        let count = DriverEntity::find()
            .filter(driver::Column::DriverLicense.eq(driver_license))
            .count(self.db.as_ref())
            .await
            .context("driver.existsByLicense")?;

        Ok(count > 0)
    }

    async fn create(&self, new_driver: NewDriver) -> RepoResult<Driver> {
        let active_model = ActiveModel {
            id: NotSet,
            user_id: Set(new_driver.user_id),
            driver_license: Set(new_driver.driver_license),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(self.db.as_ref()).await.context("driver.create")?;
        Ok(Driver::from(model))
    }

    async fn update_license(
        &self,
        id: i32,
        driver_license: String,
    ) -> RepoResult<Option<Driver>> {
        let Some(existing) = DriverEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("driver.updateLicense")?
        else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        active.driver_license = Set(driver_license);

        let model = active.update(self.db.as_ref()).await.context("driver.updateLicense")?;
        Ok(Some(Driver::from(model)))
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        let result = DriverEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .context("driver.delete")?;

        Ok(result.rows_affected > 0)
    }
}
