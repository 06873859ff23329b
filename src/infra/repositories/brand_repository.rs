//! Car brand repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::brand::{self, ActiveModel, Entity as BrandEntity};
use crate::domain::Brand;
use crate::errors::{DbResultExt, RepoResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BrandRepository: Send + Sync {
    /// Every brand, sorted by name
    async fn find_all(&self) -> RepoResult<Vec<Brand>>;

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Brand>>;

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Brand>>;

    async fn create(&self, name: String) -> RepoResult<Brand>;

    async fn update(&self, id: i32, name: String) -> RepoResult<Option<Brand>>;

    async fn delete(&self, id: i32) -> RepoResult<bool>;
}

pub struct BrandStore {
    db: Arc<DatabaseConnection>,
}

impl BrandStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BrandRepository for BrandStore {
    async fn find_all(&self) -> RepoResult<Vec<Brand>> {
        let models = BrandEntity::find()
            .order_by_asc(brand::Column::Name)
            .all(self.db.as_ref())
            .await
            .context("brand.findAll")?;

        Ok(models.into_iter().map(Brand::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Brand>> {
        let result = BrandEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("brand.findById")?;

        Ok(result.map(Brand::from))
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Brand>> {
        let result = BrandEntity::find()
            .filter(brand::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .context("brand.findByName")?;

        Ok(result.map(Brand::from))
    }

    async fn create(&self, name: String) -> RepoResult<Brand> {
        let active_model = ActiveModel {
            id: NotSet,
            name: Set(name),
        };

        let model = active_model.insert(self.db.as_ref()).await.context("brand.create")?;
        Ok(Brand::from(model))
    }

    async fn update(&self, id: i32, name: String) -> RepoResult<Option<Brand>> {
        let Some(existing) = BrandEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("brand.update")?
        else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        active.name = Set(name);

        let model = active.update(self.db.as_ref()).await.context("brand.update")?;
        Ok(Some(Brand::from(model)))
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        let result = BrandEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .context("brand.delete")?;

        Ok(result.rows_affected > 0)
    }
}
