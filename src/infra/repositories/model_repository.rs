//! Car model repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::model::{self, ActiveModel, Entity as ModelEntity};
use crate::domain::{Model, NewModel};
use crate::errors::{DbResultExt, RepoResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ModelRepository: Send + Sync {
    async fn find_all(&self) -> RepoResult<Vec<Model>>;

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Model>>;

    /// Models of one brand
    async fn find_by_brand(&self, brand_id: i32) -> RepoResult<Vec<Model>>;

    async fn find_by_name_and_brand(&self, name: &str, brand_id: i32)
        -> RepoResult<Option<Model>>;

    async fn create(&self, model: NewModel) -> RepoResult<Model>;

    async fn update(&self, id: i32, model: NewModel) -> RepoResult<Option<Model>>;

    async fn delete(&self, id: i32) -> RepoResult<bool>;
}

pub struct ModelStore {
    db: Arc<DatabaseConnection>,
}

impl ModelStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ModelRepository for ModelStore {
    async fn find_all(&self) -> RepoResult<Vec<Model>> {
        let models = ModelEntity::find()
            .order_by_asc(model::Column::Name)
            .all(self.db.as_ref())
            .await
            .context("model.findAll")?;

        Ok(models.into_iter().map(Model::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Model>> {
        let result = ModelEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("model.findById")?;

        Ok(result.map(Model::from))
    }

    async fn find_by_brand(&self, brand_id: i32) -> RepoResult<Vec<Model>> {
        let models = ModelEntity::find()
            .filter(model::Column::BrandId.eq(brand_id))
            .order_by_asc(model::Column::Name)
            .all(self.db.as_ref())
            .await
            .context("model.findByBrand")?;

        Ok(models.into_iter().map(Model::from).collect())
    }

    async fn find_by_name_and_brand(
        &self,
        name: &str,
        brand_id: i32,
    ) -> RepoResult<Option<Model>> {
        let result = ModelEntity::find()
            .filter(model::Column::Name.eq(name))
            .filter(model::Column::BrandId.eq(brand_id))
            .one(self.db.as_ref())
            .await
            .context("model.findByNameAndBrand")?;

        Ok(result.map(Model::from))
    }

    async fn create(&self, new_model: NewModel) -> RepoResult<Model> {
        let active_model = ActiveModel {
            id: NotSet,
            name: Set(new_model.name),
            brand_id: Set(new_model.brand_id),
        };

        let created = active_model.insert(self.db.as_ref()).await.context("model.create")?;
        Ok(Model::from(created))
    }

    async fn update(&self, id: i32, changes: NewModel) -> RepoResult<Option<Model>> {
        let Some(existing) = ModelEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("model.update")?
        else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        active.name = Set(changes.name);
        active.brand_id = Set(changes.brand_id);

        let updated = active.update(self.db.as_ref()).await.context("model.update")?;
        Ok(Some(Model::from(updated)))
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        let result = ModelEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .context("model.delete")?;

        Ok(result.rows_affected > 0)
    }
}
