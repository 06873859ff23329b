//! Credentials repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};

use super::entities::auth::{self, ActiveModel, Entity as AuthEntity};
use crate::domain::{Account, Auth, NewAuth, Role};
use crate::errors::{DbResultExt, RepoResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Credentials by login email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Auth>>;

    async fn find_by_user_id(&self, user_id: i32) -> RepoResult<Option<Auth>>;

    /// Email and role of a user, without the password hash
    async fn find_account(&self, user_id: i32) -> RepoResult<Option<Account>>;

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool>;

    async fn create(&self, auth: NewAuth) -> RepoResult<Auth>;

    /// Replace the password hash, `None` if the user has no credentials
    async fn update_password(&self, user_id: i32, password_hash: String)
        -> RepoResult<Option<Auth>>;

    async fn update_role(&self, user_id: i32, role: Role) -> RepoResult<Option<Auth>>;
}

pub struct AuthStore {
    db: Arc<DatabaseConnection>,
}

impl AuthStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find_model(&self, user_id: i32) -> RepoResult<Option<auth::Model>> {
        AuthEntity::find()
            .filter(auth::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .context("auth.findByUserId")
    }
}

#[async_trait]
impl AuthRepository for AuthStore {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Auth>> {
        let result = AuthEntity::find()
            .filter(auth::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .context("auth.findByEmail")?;

        Ok(result.map(Auth::from))
    }

    async fn find_by_user_id(&self, user_id: i32) -> RepoResult<Option<Auth>> {
        Ok(self.find_model(user_id).await?.map(Auth::from))
    }

    async fn find_account(&self, user_id: i32) -> RepoResult<Option<Account>> {
        Ok(self
            .find_model(user_id)
            .await?
            .map(|model| Account::from(Auth::from(model))))
    }

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        let count = AuthEntity::find()
            .filter(auth::Column::Email.eq(email))
            .count(self.db.as_ref())
            .await
            .context("auth.existsByEmail")?;

        Ok(count > 0)
    }

    async fn create(&self, new_auth: NewAuth) -> RepoResult<Auth> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: NotSet,
            user_id: Set(new_auth.user_id),
            email: Set(new_auth.email),
            password_hash: Set(new_auth.password_hash),
            role: Set(new_auth.role.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(self.db.as_ref()).await.context("auth.create")?;
        Ok(Auth::from(model))
    }

    async fn update_password(
        &self,
        user_id: i32,
        password_hash: String,
    ) -> RepoResult<Option<Auth>> {
        let Some(existing) = self.find_model(user_id).await? else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.db.as_ref()).await.context("auth.updatePassword")?;
        Ok(Some(Auth::from(model)))
    }

    async fn update_role(&self, user_id: i32, role: Role) -> RepoResult<Option<Auth>> {
        let Some(existing) = self.find_model(user_id).await? else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        active.role = Set(role.as_str().to_string());
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.db.as_ref()).await.context("auth.updateRole")?;
        Ok(Some(Auth::from(model)))
    }
}
