//! Cached reference data repositories: brands, models, colors, cities.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::CacheDomain;
use crate::domain::{Brand, City, Color, Model, NewCity, NewColor, NewModel};
use crate::errors::RepoResult;
use crate::infra::cache::CacheAside;
use crate::infra::repositories::{
    BrandRepository, CityRepository, ColorRepository, ModelRepository,
};

pub struct CachedBrandRepository {
    inner: Arc<dyn BrandRepository>,
    cache: CacheAside,
}

impl CachedBrandRepository {
    pub fn new(inner: Arc<dyn BrandRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl BrandRepository for CachedBrandRepository {
    async fn find_all(&self) -> RepoResult<Vec<Brand>> {
        self.cache
            .read(CacheDomain::Brand, "findAll", &[], || self.inner.find_all())
            .await
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Brand>> {
        self.cache
            .read(CacheDomain::Brand, "findById", &[&id], || self.inner.find_by_id(id))
            .await
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Brand>> {
        self.cache
            .read(CacheDomain::Brand, "findByName", &[&name], || {
                self.inner.find_by_name(name)
            })
            .await
    }

    async fn create(&self, name: String) -> RepoResult<Brand> {
        self.cache
            .write(CacheDomain::Brand, self.inner.create(name))
            .await
    }

    async fn update(&self, id: i32, name: String) -> RepoResult<Option<Brand>> {
        self.cache
            .write(CacheDomain::Brand, self.inner.update(id, name))
            .await
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        self.cache
            .write(CacheDomain::Brand, self.inner.delete(id))
            .await
    }
}

pub struct CachedModelRepository {
    inner: Arc<dyn ModelRepository>,
    cache: CacheAside,
}

impl CachedModelRepository {
    pub fn new(inner: Arc<dyn ModelRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl ModelRepository for CachedModelRepository {
    async fn find_all(&self) -> RepoResult<Vec<Model>> {
        self.cache
            .read(CacheDomain::Model, "findAll", &[], || self.inner.find_all())
            .await
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Model>> {
        self.cache
            .read(CacheDomain::Model, "findById", &[&id], || self.inner.find_by_id(id))
            .await
    }

    async fn find_by_brand(&self, brand_id: i32) -> RepoResult<Vec<Model>> {
        self.cache
            .read(CacheDomain::Model, "findByBrand", &[&brand_id], || {
                self.inner.find_by_brand(brand_id)
            })
            .await
    }

    async fn find_by_name_and_brand(
        &self,
        name: &str,
        brand_id: i32,
    ) -> RepoResult<Option<Model>> {
        self.cache
            .read(
                CacheDomain::Model,
                "findByNameAndBrand",
                &[&name, &brand_id],
                || self.inner.find_by_name_and_brand(name, brand_id),
            )
            .await
    }

    async fn create(&self, model: NewModel) -> RepoResult<Model> {
        self.cache
            .write(CacheDomain::Model, self.inner.create(model))
            .await
    }

    async fn update(&self, id: i32, model: NewModel) -> RepoResult<Option<Model>> {
        self.cache
            .write(CacheDomain::Model, self.inner.update(id, model))
            .await
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        self.cache
            .write(CacheDomain::Model, self.inner.delete(id))
            .await
    }
}

pub struct CachedColorRepository {
    inner: Arc<dyn ColorRepository>,
    cache: CacheAside,
}

impl CachedColorRepository {
    pub fn new(inner: Arc<dyn ColorRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl ColorRepository for CachedColorRepository {
    async fn find_all(&self) -> RepoResult<Vec<Color>> {
        self.cache
            .read(CacheDomain::Color, "findAll", &[], || self.inner.find_all())
            .await
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Color>> {
        self.cache
            .read(CacheDomain::Color, "findById", &[&id], || self.inner.find_by_id(id))
            .await
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<Color>> {
        self.cache
            .read(CacheDomain::Color, "findByName", &[&name], || {
                self.inner.find_by_name(name)
            })
            .await
    }

    async fn create(&self, color: NewColor) -> RepoResult<Color> {
        self.cache
            .write(CacheDomain::Color, self.inner.create(color))
            .await
    }

    async fn update(&self, id: i32, color: NewColor) -> RepoResult<Option<Color>> {
        self.cache
            .write(CacheDomain::Color, self.inner.update(id, color))
            .await
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        self.cache
            .write(CacheDomain::Color, self.inner.delete(id))
            .await
    }
}

pub struct CachedCityRepository {
    inner: Arc<dyn CityRepository>,
    cache: CacheAside,
}

impl CachedCityRepository {
    pub fn new(inner: Arc<dyn CityRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl CityRepository for CachedCityRepository {
    async fn find_all(&self) -> RepoResult<Vec<City>> {
        self.cache
            .read(CacheDomain::City, "findAll", &[], || self.inner.find_all())
            .await
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<City>> {
        self.cache
            .read(CacheDomain::City, "findById", &[&id], || self.inner.find_by_id(id))
            .await
    }

    async fn find_by_name_and_zipcode(
        &self,
        name: &str,
        zipcode: &str,
    ) -> RepoResult<Option<City>> {
        self.cache
            .read(
                CacheDomain::City,
                "findByNameAndZipcode",
                &[&name, &zipcode],
                || self.inner.find_by_name_and_zipcode(name, zipcode),
            )
            .await
    }

    async fn create(&self, city: NewCity) -> RepoResult<City> {
        self.cache
            .write(CacheDomain::City, self.inner.create(city))
            .await
    }

    async fn update(&self, id: i32, city: NewCity) -> RepoResult<Option<City>> {
        self.cache
            .write(CacheDomain::City, self.inner.update(id, city))
            .await
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        self.cache
            .write(CacheDomain::City, self.inner.delete(id))
            .await
    }
}
