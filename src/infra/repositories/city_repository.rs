//! City repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::city::{self, ActiveModel, Entity as CityEntity};
use crate::domain::{City, NewCity};
use crate::errors::{DbResultExt, RepoResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CityRepository: Send + Sync {
    async fn find_all(&self) -> RepoResult<Vec<City>>;

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<City>>;

    /// Cities are unique per (name, zipcode)
    async fn find_by_name_and_zipcode(&self, name: &str, zipcode: &str)
        -> RepoResult<Option<City>>;

    async fn create(&self, city: NewCity) -> RepoResult<City>;

    async fn update(&self, id: i32, city: NewCity) -> RepoResult<Option<City>>;

    async fn delete(&self, id: i32) -> RepoResult<bool>;
}

pub struct CityStore {
    db: Arc<DatabaseConnection>,
}

impl CityStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CityRepository for CityStore {
    async fn find_all(&self) -> RepoResult<Vec<City>> {
        let models = CityEntity::find()
            .order_by_asc(city::Column::Name)
            .all(self.db.as_ref())
            .await
            .context("city.findAll")?;

        Ok(models.into_iter().map(City::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<City>> {
        let result = CityEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("city.findById")?;

        Ok(result.map(City::from))
    }

    async fn find_by_name_and_zipcode(
        &self,
        name: &str,
        zipcode: &str,
    ) -> RepoResult<Option<City>> {
        let result = CityEntity::find()
            .filter(city::Column::Name.eq(name))
            .filter(city::Column::Zipcode.eq(zipcode))
            .one(self.db.as_ref())
            .await
            .context("city.findByNameAndZipcode")?;

        Ok(result.map(City::from))
    }

    async fn create(&self, new_city: NewCity) -> RepoResult<City> {
        let active_model = ActiveModel {
            id: NotSet,
            name: Set(new_city.name),
            zipcode: Set(new_city.zipcode),
        };

        let model = active_model.insert(self.db.as_ref()).await.context("city.create")?;
        Ok(City::from(model))
    }

    async fn update(&self, id: i32, changes: NewCity) -> RepoResult<Option<City>> {
        let Some(existing) = CityEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("city.update")?
        else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        active.name = Set(changes.name);
        active.zipcode = Set(changes.zipcode);

        let model = active.update(self.db.as_ref()).await.context("city.update")?;
        Ok(Some(City::from(model)))
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        let result = CityEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .context("city.delete")?;

        Ok(result.rows_affected > 0)
    }
}
