//! Driver service - driver profiles and the promotion of a user to driver.

use async_trait::async_trait;
use std::sync::Arc;

use super::Actor;
use crate::config::CacheDomain;
use crate::domain::{Driver, NewDriver, Role};
use crate::errors::{AppError, AppResult, OptionExt, Resource};
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};
use crate::with_transaction;

#[async_trait]
pub trait DriverService: Send + Sync {
    /// Register `user_id` as a driver and grant the DRIVER role
    async fn become_driver(&self, user_id: i32, driver_license: String) -> AppResult<Driver>;

    async fn get_driver(&self, id: i32) -> AppResult<Driver>;

    async fn get_driver_by_user(&self, user_id: i32) -> AppResult<Driver>;

    async fn list_drivers(&self, params: PaginationParams) -> AppResult<Page<Driver>>;

    async fn update_license(
        &self,
        actor: Actor,
        id: i32,
        driver_license: String,
    ) -> AppResult<Driver>;

    async fn delete_driver(&self, id: i32) -> AppResult<()>;
}

pub struct DriverManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> DriverManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_license_free(&self, driver_license: &str) -> AppResult<()> {
        if self.uow.drivers().exists_by_license(driver_license).await? {
            return Err(AppError::AlreadyExists(Resource::Driver));
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> DriverService for DriverManager<U> {
    async fn become_driver(&self, user_id: i32, driver_license: String) -> AppResult<Driver> {
        let driver_license = driver_license.trim().to_string();

        if !self.uow.users().exists(user_id).await? {
            return Err(AppError::NotFound(Resource::User));
        }
        if self.uow.drivers().find_by_user_id(user_id).await?.is_some() {
            return Err(AppError::AlreadyExists(Resource::Driver));
        }
        self.ensure_license_free(&driver_license).await?;

        let account = self
            .uow
            .auths()
            .find_account(user_id)
            .await?
            .ok_or_not_found(Resource::Auth)?;
        let promote = account.role < Role::Driver;

        let driver = with_transaction!(self.uow, |ctx| {
            let driver = ctx
                .drivers()
                .create(NewDriver {
                    user_id,
                    driver_license,
                })
                .await?;
            if promote {
                ctx.auths().update_role(user_id, Role::Driver).await?;
            }
            Ok(driver)
        })?;

        self.uow
            .cache()
            .invalidate_domains(&[CacheDomain::Driver, CacheDomain::Auth])
            .await;

        tracing::info!(user_id, driver_id = driver.id, promoted = promote, "Driver registered");
        Ok(driver)
    }

    async fn get_driver(&self, id: i32) -> AppResult<Driver> {
        self.uow
            .drivers()
            .find_by_id(id)
            .await?
            .ok_or_not_found(Resource::Driver)
    }

    async fn get_driver_by_user(&self, user_id: i32) -> AppResult<Driver> {
        self.uow
            .drivers()
            .find_by_user_id(user_id)
            .await?
            .ok_or_not_found(Resource::Driver)
    }

    async fn list_drivers(&self, params: PaginationParams) -> AppResult<Page<Driver>> {
        Ok(self.uow.drivers().find_all(&params).await?)
    }

    async fn update_license(
        &self,
        actor: Actor,
        id: i32,
        driver_license: String,
    ) -> AppResult<Driver> {
        let driver = self.get_driver(id).await?;
        actor.ensure_owner_or_admin(driver.user_id)?;

        let driver_license = driver_license.trim().to_string();
        if driver_license == driver.driver_license {
            return Ok(driver);
        }
        self.ensure_license_free(&driver_license).await?;

        self.uow
            .drivers()
            .update_license(id, driver_license)
            .await?
            .ok_or_not_found(Resource::Driver)
    }

    async fn delete_driver(&self, id: i32) -> AppResult<()> {
        if !self.uow.drivers().delete(id).await? {
            return Err(AppError::NotFound(Resource::Driver));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::repositories::entities::driver;
    use crate::services::testing::{self, MockRepos};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    fn created_driver_db(promote: bool) -> DatabaseConnection {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            driver::Model {
                id: 4,
                user_id: 9,
                driver_license: "LIC-9".to_string(),
                created_at: Utc::now(),
            },
        ]]);

        if promote {
            db.append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection()
        } else {
            db.into_connection()
        }
    }

    fn eligible(role: Role) -> MockRepos {
        let mut repos = MockRepos::new();
        repos.users.expect_exists().returning(|_| Ok(true));
        repos.drivers.expect_find_by_user_id().returning(|_| Ok(None));
        repos.drivers.expect_exists_by_license().returning(|_| Ok(false));
        repos
            .auths
            .expect_find_account()
            .returning(move |id| Ok(Some(testing::auth(id, role, "hash").into())));
        repos
    }

    #[tokio::test]
    async fn test_become_driver_promotes_user() {
        let uow = eligible(Role::User).into_uow_with_db(created_driver_db(true));
        let service = DriverManager::new(uow);

        let driver = service.become_driver(9, " LIC-9 ".to_string()).await.unwrap();
        assert_eq!(driver.id, 4);
        assert_eq!(driver.driver_license, "LIC-9");
    }

    #[tokio::test]
    async fn test_become_driver_keeps_admin_role() {
        // No exec result queued: a role update would fail the transaction
        let uow = eligible(Role::Admin).into_uow_with_db(created_driver_db(false));
        let service = DriverManager::new(uow);

        assert!(service.become_driver(9, "LIC-9".to_string()).await.is_ok());
    }

    #[tokio::test]
    async fn test_become_driver_twice() {
        let mut repos = MockRepos::new();
        repos.users.expect_exists().returning(|_| Ok(true));
        repos
            .drivers
            .expect_find_by_user_id()
            .returning(|user_id| Ok(Some(testing::driver(1, user_id))));

        let service = DriverManager::new(repos.into_uow());
        let result = service.become_driver(9, "LIC-9".to_string()).await;

        assert!(matches!(result, Err(AppError::AlreadyExists(Resource::Driver))));
    }

    #[tokio::test]
    async fn test_become_driver_license_taken() {
        let mut repos = MockRepos::new();
        repos.users.expect_exists().returning(|_| Ok(true));
        repos.drivers.expect_find_by_user_id().returning(|_| Ok(None));
        repos.drivers.expect_exists_by_license().returning(|_| Ok(true));

        let service = DriverManager::new(repos.into_uow());
        let result = service.become_driver(9, "LIC-1".to_string()).await;

        assert!(matches!(result, Err(AppError::AlreadyExists(Resource::Driver))));
    }

    #[tokio::test]
    async fn test_update_license_requires_owner() {
        let mut repos = MockRepos::new();
        repos
            .drivers
            .expect_find_by_id()
            .returning(|id| Ok(Some(testing::driver(id, 9))));
        repos.drivers.expect_update_license().never();

        let service = DriverManager::new(repos.into_uow());
        let result = service
            .update_license(Actor::new(10, Role::Driver), 1, "NEW".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_update_license_by_owner() {
        let mut repos = MockRepos::new();
        repos
            .drivers
            .expect_find_by_id()
            .returning(|id| Ok(Some(testing::driver(id, 9))));
        repos.drivers.expect_exists_by_license().returning(|_| Ok(false));
        repos
            .drivers
            .expect_update_license()
            .returning(|id, license| {
                let mut driver = testing::driver(id, 9);
                driver.driver_license = license;
                Ok(Some(driver))
            });

        let service = DriverManager::new(repos.into_uow());
        let driver = service
            .update_license(Actor::new(9, Role::Driver), 1, "NEW-1".to_string())
            .await
            .unwrap();

        assert_eq!(driver.driver_license, "NEW-1");
    }
}
