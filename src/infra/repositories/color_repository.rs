//! Car color repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use super::entities::color::{self, ActiveModel, Entity as ColorEntity};
use crate::domain::{Color, NewColor};
use crate::errors::{DbResultExt, RepoResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ColorRepository: Send + Sync {
    async fn find_all(&self) -> RepoResult<Vec<Color>>;

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Color>>;

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Color>>;

    async fn create(&self, color: NewColor) -> RepoResult<Color>;

    async fn update(&self, id: i32, color: NewColor) -> RepoResult<Option<Color>>;

    async fn delete(&self, id: i32) -> RepoResult<bool>;
}

pub struct ColorStore {
    db: Arc<DatabaseConnection>,
}

impl ColorStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ColorRepository for ColorStore {
    async fn find_all(&self) -> RepoResult<Vec<Color>> {
        let models = ColorEntity::find()
            .order_by_asc(color::Column::Name)
            .all(self.db.as_ref())
            .await
            .context("color.findAll")?;

        Ok(models.into_iter().map(Color::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Color>> {
        let result = ColorEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("color.findById")?;

        Ok(result.map(Color::from))
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Color>> {
        let result = ColorEntity::find()
            .filter(color::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .context("color.findByName")?;

        Ok(result.map(Color::from))
    }

    async fn create(&self, new_color: NewColor) -> RepoResult<Color> {
        let active_model = ActiveModel {
            id: NotSet,
            name: Set(new_color.name),
            hex: Set(new_color.hex),
        };

        let model = active_model.insert(self.db.as_ref()).await.context("color.create")?;
        Ok(Color::from(model))
    }

    async fn update(&self, id: i32, changes: NewColor) -> RepoResult<Option<Color>> {
        let Some(existing) = ColorEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("color.update")?
        else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        active.name = Set(changes.name);
        active.hex = Set(changes.hex);

        let model = active.update(self.db.as_ref()).await.context("color.update")?;
        Ok(Some(Color::from(model)))
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        let result = ColorEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .context("color.delete")?;

        Ok(result.rows_affected > 0)
    }
}
