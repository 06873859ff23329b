//! User service - profiles and GDPR anonymization.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::CacheDomain;
use crate::domain::{User, UserUpdate};
use crate::errors::{AppError, AppResult, OptionExt, Resource};
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};
use crate::with_transaction;

/// User service trait for dependency injection.
///
/// Anonymized users are invisible to every read.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: i32) -> AppResult<User>;

    async fn list_users(&self, params: PaginationParams) -> AppResult<Page<User>>;

    async fn update_user(&self, id: i32, update: UserUpdate) -> AppResult<User>;

    /// Scrub every piece of personal data of a user in one transaction
    async fn anonymize_user(&self, id: i32) -> AppResult<()>;

    /// Permanently delete a user (cascades to the account)
    async fn delete_user(&self, id: i32) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: i32) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or_not_found(Resource::User)
    }

    async fn list_users(&self, params: PaginationParams) -> AppResult<Page<User>> {
        Ok(self.uow.users().find_all(&params).await?)
    }

    async fn update_user(&self, id: i32, update: UserUpdate) -> AppResult<User> {
        if update.is_empty() {
            return Err(AppError::validation("Nothing to update"));
        }

        self.uow
            .users()
            .update(id, update)
            .await?
            .ok_or_not_found(Resource::User)
    }

    async fn anonymize_user(&self, id: i32) -> AppResult<()> {
        let (cancelled, had_driver) = with_transaction!(self.uow, |ctx| {
            if ctx.users().anonymize(id).await? == 0 {
                return Err(AppError::NotFound(Resource::User));
            }
            ctx.auths().anonymize(id).await?;
            let drivers = ctx.drivers().anonymize(id).await?;
            let cancelled = ctx.inscriptions().cancel_standing_for_user(id).await?;
            Ok((cancelled, drivers > 0))
        })?;

        self.uow
            .cache()
            .invalidate_domains(&[
                CacheDomain::User,
                CacheDomain::Auth,
                CacheDomain::Driver,
                CacheDomain::Inscription,
            ])
            .await;

        tracing::info!(
            user_id = id,
            cancelled_inscriptions = cancelled,
            driver = had_driver,
            "User anonymized"
        );
        Ok(())
    }

    async fn delete_user(&self, id: i32) -> AppResult<()> {
        if !self.uow.users().delete(id).await? {
            return Err(AppError::NotFound(Resource::User));
        }

        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::entities::user;
    use crate::infra::{CacheAside, Persistence};
    use crate::services::testing::{self, MockRepos};
    use mockall::predicate::eq;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repos = MockRepos::new();
        repos
            .users
            .expect_find_by_id()
            .with(eq(42))
            .returning(|_| Ok(None));

        let service = UserManager::new(repos.into_uow());
        let result = service.get_user(42).await;

        assert!(matches!(result, Err(AppError::NotFound(Resource::User))));
    }

    #[tokio::test]
    async fn test_list_users() {
        let mut repos = MockRepos::new();
        repos
            .users
            .expect_find_all()
            .returning(|_| Ok(Page::new(vec![testing::user(1), testing::user(2)], 2)));

        let service = UserManager::new(repos.into_uow());
        let page = service.list_users(PaginationParams::default()).await.unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.items[1].id, 2);
    }

    #[tokio::test]
    async fn test_update_requires_a_field() {
        let service = UserManager::new(MockRepos::new().into_uow());
        let result = service.update_user(1, UserUpdate::default()).await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let mut repos = MockRepos::new();
        repos.users.expect_update().returning(|_, _| Ok(None));

        let service = UserManager::new(repos.into_uow());
        let update = UserUpdate {
            firstname: Some("Grace".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            service.update_user(1, update).await,
            Err(AppError::NotFound(Resource::User))
        ));
    }

    #[tokio::test]
    async fn test_anonymize_scrubs_all_tables() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(1), exec(1), exec(2)])
            .into_connection();

        let service = UserManager::new(MockRepos::new().into_uow_with_db(db));
        service.anonymize_user(7).await.unwrap();
    }

    #[tokio::test]
    async fn test_anonymized_user_is_hidden_from_lookups() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(1), exec(1), exec(2)])
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let uow = Persistence::new(Arc::clone(&db), CacheAside::disabled());
        let service = UserManager::new(Arc::new(uow));

        service.anonymize_user(7).await.unwrap();
        assert!(matches!(
            service.get_user(7).await,
            Err(AppError::NotFound(Resource::User))
        ));

        drop(service);
        let log = Arc::try_unwrap(db)
            .expect("connection released")
            .into_transaction_log();
        assert_eq!(log.len(), 2);

        // One transaction: BEGIN, four scrubbing updates, COMMIT
        let scrub: Vec<&str> = log[0].statements().iter().map(|s| s.sql.as_str()).collect();
        assert_eq!(scrub.len(), 6);
        assert_eq!(scrub[0], "BEGIN");
        for (sql, table) in scrub[1..5]
            .iter()
            .zip(["users", "auths", "drivers", "inscriptions"])
        {
            assert!(sql.starts_with(&format!(r#"UPDATE "{}""#, table)), "{sql}");
        }
        assert_eq!(scrub[5], "COMMIT");

        let lookup = &log[1].statements()[0].sql;
        assert!(lookup.starts_with("SELECT"));
        assert!(lookup.contains(r#""anonymized_at" IS NULL"#));
    }

    #[tokio::test]
    async fn test_anonymize_unknown_or_already_anonymized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .into_connection();

        let service = UserManager::new(MockRepos::new().into_uow_with_db(db));
        let result = service.anonymize_user(7).await;

        assert!(matches!(result, Err(AppError::NotFound(Resource::User))));
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let mut repos = MockRepos::new();
        repos.users.expect_delete().returning(|_| Ok(false));

        let service = UserManager::new(repos.into_uow());
        assert!(matches!(
            service.delete_user(3).await,
            Err(AppError::NotFound(Resource::User))
        ));
    }
}
