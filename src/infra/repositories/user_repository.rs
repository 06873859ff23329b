//! User profile repository.
//!
//! Anonymized profiles (`anonymized_at` set) are invisible to every
//! lookup: they stay in the table for referential integrity only.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::base::fetch_page;
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{NewUser, User, UserUpdate};
use crate::errors::{DbResultExt, RepoResult};
use crate::types::{Page, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Page of active users, oldest first
    async fn find_all(&self, params: &PaginationParams) -> RepoResult<Page<User>>;

    /// Find active user by ID
    async fn find_by_id(&self, id: i32) -> RepoResult<Option<User>>;

    /// Whether an active user with this ID exists
    async fn exists(&self, id: i32) -> RepoResult<bool>;

    async fn create(&self, user: NewUser) -> RepoResult<User>;

    /// Update an active user, `None` if there is none
    async fn update(&self, id: i32, update: UserUpdate) -> RepoResult<Option<User>>;

    /// Hard delete, `false` if nothing was deleted
    async fn delete(&self, id: i32) -> RepoResult<bool>;
}

/// Database-backed [`UserRepository`]
pub struct UserStore {
    db: Arc<DatabaseConnection>,
}

impl UserStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find_active(&self, id: i32) -> RepoResult<Option<user::Model>> {
        UserEntity::find_by_id(id)
            .filter(user::Column::AnonymizedAt.is_null())
            .one(self.db.as_ref())
            .await
            .context("user.findById")
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_all(&self, params: &PaginationParams) -> RepoResult<Page<User>> {
        let query = UserEntity::find()
            .filter(user::Column::AnonymizedAt.is_null())
            .order_by_asc(user::Column::Id);

        let page = fetch_page(query, self.db.as_ref(), params, "user.findAll").await?;
        Ok(page.map(User::from))
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<User>> {
        Ok(self.find_active(id).await?.map(User::from))
    }

    async fn exists(&self, id: i32) -> RepoResult<bool> {
        let count = UserEntity::find_by_id(id)
            .filter(user::Column::AnonymizedAt.is_null())
            .count(self.db.as_ref())
            .await
            .context("user.exists")?;

        Ok(count > 0)
    }

    async fn create(&self, new_user: NewUser) -> RepoResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: NotSet,
            firstname: Set(new_user.firstname),
            lastname: Set(new_user.lastname),
            phone: Set(new_user.phone),
            created_at: Set(now),
            updated_at: Set(now),
            anonymized_at: Set(None),
        };

        let model = active_model.insert(self.db.as_ref()).await.context("user.create")?;
        Ok(User::from(model))
    }

    async fn update(&self, id: i32, update: UserUpdate) -> RepoResult<Option<User>> {
        let Some(existing) = self.find_active(id).await? else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        if let Some(firstname) = update.firstname {
            active.firstname = Set(firstname);
        }
        if let Some(lastname) = update.lastname {
            active.lastname = Set(lastname);
        }
        if let Some(phone) = update.phone {
            active.phone = Set(Some(phone));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.db.as_ref()).await.context("user.update")?;
        Ok(Some(User::from(model)))
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        let result = UserEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .context("user.delete")?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    use super::*;

    fn count(n: i64) -> Vec<BTreeMap<&'static str, Value>> {
        vec![BTreeMap::from([("num_items", Value::from(n))])]
    }

    #[tokio::test]
    async fn test_every_lookup_skips_anonymized_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count(0)])
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([count(0)])
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let store = UserStore::new(Arc::clone(&db));

        assert_eq!(store.find_all(&PaginationParams::default()).await.unwrap().total, 0);
        assert!(!store.exists(3).await.unwrap());
        assert!(store.find_by_id(3).await.unwrap().is_none());

        drop(store);
        let log = Arc::try_unwrap(db)
            .expect("connection released")
            .into_transaction_log();
        assert_eq!(log.len(), 4);
        for entry in &log {
            let sql = &entry.statements()[0].sql;
            assert!(sql.contains(r#""anonymized_at" IS NULL"#), "{sql}");
        }
    }
}
