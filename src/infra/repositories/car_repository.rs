//! Car repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::base::fetch_page;
use super::entities::car::{self, ActiveModel, Entity as CarEntity};
use crate::domain::{Car, CarUpdate, NewCar};
use crate::errors::{DbResultExt, RepoResult};
use crate::types::{Page, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CarRepository: Send + Sync {
    async fn find_all(&self, params: &PaginationParams) -> RepoResult<Page<Car>>;

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Car>>;

    /// Cars owned by a driver
    async fn find_by_driver(&self, driver_id: i32) -> RepoResult<Vec<Car>>;

    /// Lookup by normalized plate
    async fn find_by_immat(&self, immat: &str) -> RepoResult<Option<Car>>;

    async fn create(&self, car: NewCar) -> RepoResult<Car>;

    async fn update(&self, id: i32, update: CarUpdate) -> RepoResult<Option<Car>>;

    async fn delete(&self, id: i32) -> RepoResult<bool>;
}

pub struct CarStore {
    db: Arc<DatabaseConnection>,
}

impl CarStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CarRepository for CarStore {
    async fn find_all(&self, params: &PaginationParams) -> RepoResult<Page<Car>> {
        let query = CarEntity::find().order_by_asc(car::Column::Id);
        let page = fetch_page(query, self.db.as_ref(), params, "car.findAll").await?;
        Ok(page.map(Car::from))
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Car>> {
        let result = CarEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("car.findById")?;

        Ok(result.map(Car::from))
    }

    async fn find_by_driver(&self, driver_id: i32) -> RepoResult<Vec<Car>> {
        let models = CarEntity::find()
            .filter(car::Column::DriverId.eq(driver_id))
            .order_by_asc(car::Column::Id)
            .all(self.db.as_ref())
            .await
            .context("car.findByDriver")?;

        Ok(models.into_iter().map(Car::from).collect())
    }

    async fn find_by_immat(&self, immat: &str) -> RepoResult<Option<Car>> {
        let result = CarEntity::find()
            .filter(car::Column::Immat.eq(immat))
            .one(self.db.as_ref())
            .await
            .context("car.findByImmat")?;

        Ok(result.map(Car::from))
    }

    async fn create(&self, new_car: NewCar) -> RepoResult<Car> {
        let active_model = ActiveModel {
            id: NotSet,
            immat: Set(new_car.immat),
            model_id: Set(new_car.model_id),
            color_id: Set(new_car.color_id),
            driver_id: Set(new_car.driver_id),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(self.db.as_ref()).await.context("car.create")?;
        Ok(Car::from(model))
    }

    async fn update(&self, id: i32, update: CarUpdate) -> RepoResult<Option<Car>> {
        let Some(existing) = CarEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("car.update")?
        else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        if let Some(immat) = update.immat {
            active.immat = Set(immat);
        }
        if let Some(model_id) = update.model_id {
            active.model_id = Set(model_id);
        }
        if let Some(color_id) = update.color_id {
            active.color_id = Set(color_id);
        }

        let model = active.update(self.db.as_ref()).await.context("car.update")?;
        Ok(Some(Car::from(model)))
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        let result = CarEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .context("car.delete")?;

        Ok(result.rows_affected > 0)
    }
}
