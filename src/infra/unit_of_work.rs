//! Unit of Work pattern implementation.
//!
//! Centralizes access to the (cached) repositories and runs multi-table
//! use-cases inside one database transaction. Transactional repositories
//! bypass the cache; callers invalidate the touched domains through
//! [`UnitOfWork::cache`] once the transaction committed.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, AccessMode, ActiveModelTrait, ActiveValue::NotSet, ColumnTrait,
    DatabaseConnection, DatabaseTransaction, EntityTrait, IsolationLevel, QueryFilter, Set,
    TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::cache::CacheAside;
use super::cached::{
    CachedAuthRepository, CachedBrandRepository, CachedCarRepository, CachedCityRepository,
    CachedColorRepository, CachedDriverRepository, CachedInscriptionRepository,
    CachedModelRepository, CachedTravelRepository, CachedUserRepository,
};
use super::repositories::entities::{auth, driver, inscription, user};
use super::repositories::{
    AuthRepository, AuthStore, BrandRepository, BrandStore, CarRepository, CarStore,
    CityRepository, CityStore, ColorRepository, ColorStore, DriverRepository, DriverStore,
    InscriptionRepository, InscriptionStore, ModelRepository, ModelStore, TravelRepository,
    TravelStore, UserRepository, UserStore,
};
use crate::config::{
    ANONYMIZED_EMAIL_DOMAIN, ANONYMIZED_LICENSE_PREFIX, ANONYMIZED_NAME, ANONYMIZED_PASSWORD,
};
use crate::domain::{Auth, Driver, InscriptionStatus, NewAuth, NewDriver, NewUser, Role, User};
use crate::errors::{AppResult, DbResultExt, RepoResult};

/// Boxed future returned by transaction closures
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not object safe because of the generic transaction methods; services
/// are generic over it instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;
    fn auths(&self) -> Arc<dyn AuthRepository>;
    fn drivers(&self) -> Arc<dyn DriverRepository>;
    fn cars(&self) -> Arc<dyn CarRepository>;
    fn brands(&self) -> Arc<dyn BrandRepository>;
    fn models(&self) -> Arc<dyn ModelRepository>;
    fn colors(&self) -> Arc<dyn ColorRepository>;
    fn cities(&self) -> Arc<dyn CityRepository>;
    fn travels(&self) -> Arc<dyn TravelRepository>;
    fn inscriptions(&self) -> Arc<dyn InscriptionRepository>;

    /// Cache shared by the repositories, for post-commit invalidation
    fn cache(&self) -> &CacheAside;

    /// Execute a closure within a transaction.
    ///
    /// Committed on success, rolled back on error. Uses ReadCommitted.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Run `f` inside a ReadCommitted transaction on `db`.
pub async fn run_transaction<F, T>(db: &DatabaseConnection, f: F) -> AppResult<T>
where
    F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
    T: Send,
{
    let txn = db
        .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
        .await
        .context("transaction.begin")?;

    let ctx = TransactionContext::new(&txn);

    match f(ctx).await {
        Ok(result) => {
            txn.commit().await.context("transaction.commit")?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!(error = %rollback_err, "Transaction rollback failed");
            }
            Err(e)
        }
    }
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same database transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUserRepository<'_> {
        TxUserRepository { txn: self.txn }
    }

    pub fn auths(&self) -> TxAuthRepository<'_> {
        TxAuthRepository { txn: self.txn }
    }

    pub fn drivers(&self) -> TxDriverRepository<'_> {
        TxDriverRepository { txn: self.txn }
    }

    pub fn inscriptions(&self) -> TxInscriptionRepository<'_> {
        TxInscriptionRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork: sea-orm stores behind cache-aside
/// decorators.
pub struct Persistence {
    db: Arc<DatabaseConnection>,
    cache: CacheAside,
    users: Arc<dyn UserRepository>,
    auths: Arc<dyn AuthRepository>,
    drivers: Arc<dyn DriverRepository>,
    cars: Arc<dyn CarRepository>,
    brands: Arc<dyn BrandRepository>,
    models: Arc<dyn ModelRepository>,
    colors: Arc<dyn ColorRepository>,
    cities: Arc<dyn CityRepository>,
    travels: Arc<dyn TravelRepository>,
    inscriptions: Arc<dyn InscriptionRepository>,
}

impl Persistence {
    /// Accepts an owned connection or one already shared with a [`Database`](super::Database).
    pub fn new(db: impl Into<Arc<DatabaseConnection>>, cache: CacheAside) -> Self {
        let db = db.into();
        Self {
            users: Arc::new(CachedUserRepository::new(
                Arc::new(UserStore::new(Arc::clone(&db))),
                cache.clone(),
            )),
            auths: Arc::new(CachedAuthRepository::new(
                Arc::new(AuthStore::new(Arc::clone(&db))),
                cache.clone(),
            )),
            drivers: Arc::new(CachedDriverRepository::new(
                Arc::new(DriverStore::new(Arc::clone(&db))),
                cache.clone(),
            )),
            cars: Arc::new(CachedCarRepository::new(
                Arc::new(CarStore::new(Arc::clone(&db))),
                cache.clone(),
            )),
            brands: Arc::new(CachedBrandRepository::new(
                Arc::new(BrandStore::new(Arc::clone(&db))),
                cache.clone(),
            )),
            models: Arc::new(CachedModelRepository::new(
                Arc::new(ModelStore::new(Arc::clone(&db))),
                cache.clone(),
            )),
            colors: Arc::new(CachedColorRepository::new(
                Arc::new(ColorStore::new(Arc::clone(&db))),
                cache.clone(),
            )),
            cities: Arc::new(CachedCityRepository::new(
                Arc::new(CityStore::new(Arc::clone(&db))),
                cache.clone(),
            )),
            travels: Arc::new(CachedTravelRepository::new(
                Arc::new(TravelStore::new(Arc::clone(&db))),
                cache.clone(),
            )),
            inscriptions: Arc::new(CachedInscriptionRepository::new(
                Arc::new(InscriptionStore::new(Arc::clone(&db))),
                cache.clone(),
            )),
            cache,
            db,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn auths(&self) -> Arc<dyn AuthRepository> {
        self.auths.clone()
    }

    fn drivers(&self) -> Arc<dyn DriverRepository> {
        self.drivers.clone()
    }

    fn cars(&self) -> Arc<dyn CarRepository> {
        self.cars.clone()
    }

    fn brands(&self) -> Arc<dyn BrandRepository> {
        self.brands.clone()
    }

    fn models(&self) -> Arc<dyn ModelRepository> {
        self.models.clone()
    }

    fn colors(&self) -> Arc<dyn ColorRepository> {
        self.colors.clone()
    }

    fn cities(&self) -> Arc<dyn CityRepository> {
        self.cities.clone()
    }

    fn travels(&self) -> Arc<dyn TravelRepository> {
        self.travels.clone()
    }

    fn inscriptions(&self) -> Arc<dyn InscriptionRepository> {
        self.inscriptions.clone()
    }

    fn cache(&self) -> &CacheAside {
        &self.cache
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        run_transaction(self.db.as_ref(), f).await
    }
}

/// Transaction-aware user repository. Lookups exclude anonymized users.
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    pub async fn find_by_id(&self, id: i32) -> RepoResult<Option<User>> {
        let result = user::Entity::find_by_id(id)
            .filter(user::Column::AnonymizedAt.is_null())
            .one(self.txn)
            .await
            .context("user.findById")?;

        Ok(result.map(User::from))
    }

    pub async fn create(&self, new_user: NewUser) -> RepoResult<User> {
        let now = chrono::Utc::now();
        let active_model = user::ActiveModel {
            id: NotSet,
            firstname: Set(new_user.firstname),
            lastname: Set(new_user.lastname),
            phone: Set(new_user.phone),
            created_at: Set(now),
            updated_at: Set(now),
            anonymized_at: Set(None),
        };

        let model = active_model.insert(self.txn).await.context("user.create")?;
        Ok(User::from(model))
    }

    /// Scrub the profile and set the anonymization sentinel
    pub async fn anonymize(&self, id: i32) -> RepoResult<u64> {
        let now = chrono::Utc::now();
        let result = user::Entity::update_many()
            .col_expr(user::Column::Firstname, Expr::value(ANONYMIZED_NAME))
            .col_expr(user::Column::Lastname, Expr::value(ANONYMIZED_NAME))
            .col_expr(user::Column::Phone, Expr::value(Option::<String>::None))
            .col_expr(user::Column::AnonymizedAt, Expr::value(now))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::AnonymizedAt.is_null())
            .exec(self.txn)
            .await
            .context("user.anonymize")?;

        Ok(result.rows_affected)
    }
}

/// Transaction-aware credentials repository
pub struct TxAuthRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxAuthRepository<'a> {
    pub async fn create(&self, new_auth: NewAuth) -> RepoResult<Auth> {
        let now = chrono::Utc::now();
        let active_model = auth::ActiveModel {
            id: NotSet,
            user_id: Set(new_auth.user_id),
            email: Set(new_auth.email),
            password_hash: Set(new_auth.password_hash),
            role: Set(new_auth.role.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(self.txn).await.context("auth.create")?;
        Ok(Auth::from(model))
    }

    pub async fn update_role(&self, user_id: i32, role: Role) -> RepoResult<u64> {
        let result = auth::Entity::update_many()
            .col_expr(auth::Column::Role, Expr::value(role.as_str()))
            .col_expr(auth::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(auth::Column::UserId.eq(user_id))
            .exec(self.txn)
            .await
            .context("auth.updateRole")?;

        Ok(result.rows_affected)
    }

    /// Replace email and password hash with unusable values
    pub async fn anonymize(&self, user_id: i32) -> RepoResult<u64> {
        let email = format!("anonymized-{}@{}", user_id, ANONYMIZED_EMAIL_DOMAIN);
        let result = auth::Entity::update_many()
            .col_expr(auth::Column::Email, Expr::value(email))
            .col_expr(auth::Column::PasswordHash, Expr::value(ANONYMIZED_PASSWORD))
            .col_expr(auth::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(auth::Column::UserId.eq(user_id))
            .exec(self.txn)
            .await
            .context("auth.anonymize")?;

        Ok(result.rows_affected)
    }
}

/// Transaction-aware driver repository
pub struct TxDriverRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxDriverRepository<'a> {
    pub async fn find_by_user_id(&self, user_id: i32) -> RepoResult<Option<Driver>> {
        let result = driver::Entity::find()
            .filter(driver::Column::UserId.eq(user_id))
            .one(self.txn)
            .await
            .context("driver.findByUserId")?;

        Ok(result.map(Driver::from))
    }

    pub async fn create(&self, new_driver: NewDriver) -> RepoResult<Driver> {
        let active_model = driver::ActiveModel {
            id: NotSet,
            user_id: Set(new_driver.user_id),
            driver_license: Set(new_driver.driver_license),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(self.txn).await.context("driver.create")?;
        Ok(Driver::from(model))
    }

    /// Scrub the license of the user's driver profile, if any
    pub async fn anonymize(&self, user_id: i32) -> RepoResult<u64> {
        let license = format!("{}{}", ANONYMIZED_LICENSE_PREFIX, user_id);
        let result = driver::Entity::update_many()
            .col_expr(driver::Column::DriverLicense, Expr::value(license))
            .filter(driver::Column::UserId.eq(user_id))
            .exec(self.txn)
            .await
            .context("driver.anonymize")?;

        Ok(result.rows_affected)
    }
}

/// Transaction-aware inscription repository
pub struct TxInscriptionRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxInscriptionRepository<'a> {
    /// Cancel every pending or accepted inscription of a user
    pub async fn cancel_standing_for_user(&self, user_id: i32) -> RepoResult<u64> {
        let active: Vec<&str> = InscriptionStatus::ACTIVE
            .iter()
            .map(InscriptionStatus::as_str)
            .collect();

        let result = inscription::Entity::update_many()
            .col_expr(
                inscription::Column::Status,
                Expr::value(InscriptionStatus::Cancelled.as_str()),
            )
            .filter(inscription::Column::UserId.eq(user_id))
            .filter(inscription::Column::Status.is_in(active))
            .exec(self.txn)
            .await
            .context("inscription.cancelStandingForUser")?;

        Ok(result.rows_affected)
    }
}

/// Shorthand for running a block inside [`UnitOfWork::transaction`].
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
