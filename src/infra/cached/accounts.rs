//! Cached user, credentials and driver repositories.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::CacheDomain;
use crate::domain::{Account, Auth, Driver, NewAuth, NewDriver, NewUser, Role, User, UserUpdate};
use crate::errors::RepoResult;
use crate::infra::cache::CacheAside;
use crate::infra::repositories::{AuthRepository, DriverRepository, UserRepository};
use crate::types::{Page, PaginationParams};

pub struct CachedUserRepository {
    inner: Arc<dyn UserRepository>,
    cache: CacheAside,
}

impl CachedUserRepository {
    pub fn new(inner: Arc<dyn UserRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl UserRepository for CachedUserRepository {
    async fn find_all(&self, params: &PaginationParams) -> RepoResult<Page<User>> {
        self.cache
            .read(CacheDomain::User, "findAll", &[params], || self.inner.find_all(params))
            .await
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<User>> {
        self.cache
            .read(CacheDomain::User, "findById", &[&id], || self.inner.find_by_id(id))
            .await
    }

    async fn exists(&self, id: i32) -> RepoResult<bool> {
        self.cache
            .read(CacheDomain::User, "exists", &[&id], || self.inner.exists(id))
            .await
    }

    async fn create(&self, user: NewUser) -> RepoResult<User> {
        self.cache
            .write(CacheDomain::User, self.inner.create(user))
            .await
    }

    async fn update(&self, id: i32, update: UserUpdate) -> RepoResult<Option<User>> {
        self.cache
            .write(CacheDomain::User, self.inner.update(id, update))
            .await
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        self.cache
            .write(CacheDomain::User, self.inner.delete(id))
            .await
    }
}

pub struct CachedAuthRepository {
    inner: Arc<dyn AuthRepository>,
    cache: CacheAside,
}

impl CachedAuthRepository {
    pub fn new(inner: Arc<dyn AuthRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl AuthRepository for CachedAuthRepository {
    // Password hashes stay out of the cache: reads returning `Auth` go
    // straight to the store.
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Auth>> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_user_id(&self, user_id: i32) -> RepoResult<Option<Auth>> {
        self.inner.find_by_user_id(user_id).await
    }

    async fn find_account(&self, user_id: i32) -> RepoResult<Option<Account>> {
        self.cache
            .read(CacheDomain::Auth, "findAccount", &[&user_id], || {
                self.inner.find_account(user_id)
            })
            .await
    }

    async fn exists_by_email(&self, email: &str) -> RepoResult<bool> {
        self.cache
            .read(CacheDomain::Auth, "existsByEmail", &[&email], || {
                self.inner.exists_by_email(email)
            })
            .await
    }

    async fn create(&self, auth: NewAuth) -> RepoResult<Auth> {
        self.cache
            .write(CacheDomain::Auth, self.inner.create(auth))
            .await
    }

    async fn update_password(
        &self,
        user_id: i32,
        password_hash: String,
    ) -> RepoResult<Option<Auth>> {
        self.cache
            .write(
                CacheDomain::Auth,
                self.inner.update_password(user_id, password_hash),
            )
            .await
    }

    async fn update_role(&self, user_id: i32, role: Role) -> RepoResult<Option<Auth>> {
        self.cache
            .write(CacheDomain::Auth, self.inner.update_role(user_id, role))
            .await
    }
}

pub struct CachedDriverRepository {
    inner: Arc<dyn DriverRepository>,
    cache: CacheAside,
}

impl CachedDriverRepository {
    pub fn new(inner: Arc<dyn DriverRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl DriverRepository for CachedDriverRepository {
    async fn find_all(&self, params: &PaginationParams) -> RepoResult<Page<Driver>> {
        self.cache
            .read(CacheDomain::Driver, "findAll", &[params], || {
                self.inner.find_all(params)
            })
            .await
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Driver>> {
        self.cache
            .read(CacheDomain::Driver, "findById", &[&id], || {
                self.inner.find_by_id(id)
            })
            .await
    }

    async fn find_by_user_id(&self, user_id: i32) -> RepoResult<Option<Driver>> {
        self.cache
            .read(CacheDomain::Driver, "findByUserId", &[&user_id], || {
                self.inner.find_by_user_id(user_id)
            })
            .await
    }

    async fn exists_by_license(&self, driver_license: &str) -> RepoResult<bool> {
        self.cache
            .read(CacheDomain::Driver, "existsByLicense", &[&driver_license], || {
                self.inner.exists_by_license(driver_license)
            })
            .await
    }

    async fn create(&self, driver: NewDriver) -> RepoResult<Driver> {
        self.cache
            .write(CacheDomain::Driver, self.inner.create(driver))
            .await
    }

    async fn update_license(
        &self,
        id: i32,
        driver_license: String,
    ) -> RepoResult<Option<Driver>> {
        self.cache
            .write(
                CacheDomain::Driver,
                self.inner.update_license(id, driver_license),
            )
            .await
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        self.cache
            .write(CacheDomain::Driver, self.inner.delete(id))
            .await
    }
}
