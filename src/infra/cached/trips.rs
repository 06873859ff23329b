//! Cached car, travel and inscription repositories.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::CacheDomain;
use crate::domain::{
    Car, CarUpdate, Inscription, InscriptionStatus, NewCar, NewInscription, NewTravel, Travel,
    TravelFilters, TravelUpdate,
};
use crate::errors::RepoResult;
use crate::infra::cache::CacheAside;
use crate::infra::repositories::{CarRepository, InscriptionRepository, TravelRepository};
use crate::types::{Page, PaginationParams};

pub struct CachedCarRepository {
    inner: Arc<dyn CarRepository>,
    cache: CacheAside,
}

impl CachedCarRepository {
    pub fn new(inner: Arc<dyn CarRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl CarRepository for CachedCarRepository {
    async fn find_all(&self, params: &PaginationParams) -> RepoResult<Page<Car>> {
        self.cache
            .read(CacheDomain::Car, "findAll", &[params], || self.inner.find_all(params))
            .await
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Car>> {
        self.cache
            .read(CacheDomain::Car, "findById", &[&id], || self.inner.find_by_id(id))
            .await
    }

    async fn find_by_driver(&self, driver_id: i32) -> RepoResult<Vec<Car>> {
        self.cache
            .read(CacheDomain::Car, "findByDriver", &[&driver_id], || {
                self.inner.find_by_driver(driver_id)
            })
            .await
    }

    async fn find_by_immat(&self, immat: &str) -> RepoResult<Option<Car>> {
        self.cache
            .read(CacheDomain::Car, "findByImmat", &[&immat], || {
                self.inner.find_by_immat(immat)
            })
            .await
    }

    async fn create(&self, car: NewCar) -> RepoResult<Car> {
        self.cache
            .write(CacheDomain::Car, self.inner.create(car))
            .await
    }

    async fn update(&self, id: i32, update: CarUpdate) -> RepoResult<Option<Car>> {
        self.cache
            .write(CacheDomain::Car, self.inner.update(id, update))
            .await
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        self.cache
            .write(CacheDomain::Car, self.inner.delete(id))
            .await
    }
}

pub struct CachedTravelRepository {
    inner: Arc<dyn TravelRepository>,
    cache: CacheAside,
}

impl CachedTravelRepository {
    pub fn new(inner: Arc<dyn TravelRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl TravelRepository for CachedTravelRepository {
    async fn find_all(
        &self,
        filters: &TravelFilters,
        params: &PaginationParams,
    ) -> RepoResult<Page<Travel>> {
        self.cache
            .read(CacheDomain::Travel, "findAll", &[filters, params], || {
                self.inner.find_all(filters, params)
            })
            .await
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Travel>> {
        self.cache
            .read(CacheDomain::Travel, "findById", &[&id], || {
                self.inner.find_by_id(id)
            })
            .await
    }

    async fn find_by_driver(&self, driver_id: i32) -> RepoResult<Vec<Travel>> {
        self.cache
            .read(CacheDomain::Travel, "findByDriver", &[&driver_id], || {
                self.inner.find_by_driver(driver_id)
            })
            .await
    }

    async fn create(&self, travel: NewTravel) -> RepoResult<Travel> {
        self.cache
            .write(CacheDomain::Travel, self.inner.create(travel))
            .await
    }

    async fn update(&self, id: i32, update: TravelUpdate) -> RepoResult<Option<Travel>> {
        self.cache
            .write(CacheDomain::Travel, self.inner.update(id, update))
            .await
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        self.cache
            .write(CacheDomain::Travel, self.inner.delete(id))
            .await
    }
}

pub struct CachedInscriptionRepository {
    inner: Arc<dyn InscriptionRepository>,
    cache: CacheAside,
}

impl CachedInscriptionRepository {
    pub fn new(inner: Arc<dyn InscriptionRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl InscriptionRepository for CachedInscriptionRepository {
    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Inscription>> {
        self.cache
            .read(CacheDomain::Inscription, "findById", &[&id], || {
                self.inner.find_by_id(id)
            })
            .await
    }

    async fn find_by_user(&self, user_id: i32) -> RepoResult<Vec<Inscription>> {
        self.cache
            .read(CacheDomain::Inscription, "findByUser", &[&user_id], || {
                self.inner.find_by_user(user_id)
            })
            .await
    }

    async fn find_by_travel(&self, travel_id: i32) -> RepoResult<Vec<Inscription>> {
        self.cache
            .read(CacheDomain::Inscription, "findByTravel", &[&travel_id], || {
                self.inner.find_by_travel(travel_id)
            })
            .await
    }

    async fn find_by_user_and_travel(
        &self,
        user_id: i32,
        travel_id: i32,
    ) -> RepoResult<Option<Inscription>> {
        self.cache
            .read(
                CacheDomain::Inscription,
                "findByUserAndTravel",
                &[&user_id, &travel_id],
                || self.inner.find_by_user_and_travel(user_id, travel_id),
            )
            .await
    }

    async fn count_active_by_travel(&self, travel_id: i32) -> RepoResult<u64> {
        self.cache
            .read(
                CacheDomain::Inscription,
                "countActiveByTravel",
                &[&travel_id],
                || self.inner.count_active_by_travel(travel_id),
            )
            .await
    }

    async fn create(&self, inscription: NewInscription) -> RepoResult<Inscription> {
        self.cache
            .write(CacheDomain::Inscription, self.inner.create(inscription))
            .await
    }

    async fn update_status(
        &self,
        id: i32,
        status: InscriptionStatus,
    ) -> RepoResult<Option<Inscription>> {
        self.cache
            .write(CacheDomain::Inscription, self.inner.update_status(id, status))
            .await
    }

}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::config::CacheConfig;
    use crate::infra::cache::MockCacheBackend;
    use crate::infra::repositories::{
        MockCarRepository, MockInscriptionRepository, MockTravelRepository,
    };

    fn car(id: i32) -> Car {
        Car {
            id,
            immat: "AB-123-CD".to_string(),
            model_id: 1,
            color_id: 1,
            driver_id: 1,
            created_at: Utc::now(),
        }
    }

    fn enabled(backend: MockCacheBackend) -> CacheAside {
        CacheAside::new(Arc::new(backend), Arc::new(CacheConfig::default()))
    }

    #[tokio::test]
    async fn test_car_find_by_id_second_call_hits_cache() {
        let stored: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let mut inner = MockCarRepository::new();
        inner
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(car(id))));

        let mut backend = MockCacheBackend::new();
        let reader = Arc::clone(&stored);
        backend
            .expect_get()
            .withf(|key| key == "covoitapi:car:findById:1")
            .returning(move |_| Ok(reader.lock().unwrap().clone()));
        let writer = Arc::clone(&stored);
        backend
            .expect_set()
            .withf(|_, _, ttl| *ttl == 300)
            .times(1)
            .returning(move |_, value, _| {
                *writer.lock().unwrap() = Some(value);
                Ok(())
            });

        let repo = CachedCarRepository::new(Arc::new(inner), enabled(backend));
        let first = repo.find_by_id(1).await.unwrap();
        let second = repo.find_by_id(1).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(second.map(|c| c.id), Some(1));
    }

    #[tokio::test]
    async fn test_inscription_create_clears_inscription_and_travel() {
        let mut inner = MockInscriptionRepository::new();
        inner.expect_create().returning(|new| {
            Ok(Inscription {
                id: 10,
                user_id: new.user_id,
                travel_id: new.travel_id,
                status: InscriptionStatus::Pending,
                created_at: Utc::now(),
            })
        });

        let deleted = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&deleted);
        let mut backend = MockCacheBackend::new();
        backend
            .expect_delete_by_pattern()
            .times(2)
            .returning(move |pattern| {
                recorder.lock().unwrap().push(pattern.to_string());
                Ok(1)
            });

        let repo = CachedInscriptionRepository::new(Arc::new(inner), enabled(backend));
        repo.create(NewInscription {
            user_id: 2,
            travel_id: 3,
        })
        .await
        .unwrap();

        let mut deleted = deleted.lock().unwrap().clone();
        deleted.sort();
        assert_eq!(deleted, vec!["covoitapi:inscription:*", "covoitapi:travel:*"]);
    }

    #[tokio::test]
    async fn test_travel_listing_key_includes_filters_and_page() {
        let mut inner = MockTravelRepository::new();
        inner
            .expect_find_all()
            .returning(|_, _| Ok(Page::new(Vec::new(), 0)));

        let mut backend = MockCacheBackend::new();
        backend
            .expect_get()
            .withf(|key| key == "covoitapi:travel:findAll:4:-:-:2:10")
            .times(1)
            .returning(|_| Ok(None));
        backend.expect_set().returning(|_, _, _| Ok(()));

        let repo = CachedTravelRepository::new(Arc::new(inner), enabled(backend));
        let filters = TravelFilters {
            departure_city_id: Some(4),
            ..Default::default()
        };
        let page = repo
            .find_all(&filters, &PaginationParams::new(2, 10))
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_disabled_cache_delegates_directly() {
        let mut inner = MockCarRepository::new();
        inner.expect_find_by_id().times(2).returning(|id| Ok(Some(car(id))));
        inner.expect_delete().times(1).returning(|_| Ok(true));

        let mut backend = MockCacheBackend::new();
        backend.expect_get().never();
        backend.expect_set().never();
        backend.expect_delete_by_pattern().never();

        let cache = CacheAside::new(Arc::new(backend), Arc::new(CacheConfig::disabled()));
        let repo = CachedCarRepository::new(Arc::new(inner), cache);

        repo.find_by_id(1).await.unwrap();
        repo.find_by_id(1).await.unwrap();
        assert!(repo.delete(1).await.unwrap());
    }
}
