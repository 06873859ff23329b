//! City service - departure and arrival places.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{City, NewCity};
use crate::errors::{AppError, AppResult, OptionExt, Resource};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait CityService: Send + Sync {
    async fn list_cities(&self) -> AppResult<Vec<City>>;

    async fn get_city(&self, id: i32) -> AppResult<City>;

    /// (name, zipcode) is unique
    async fn create_city(&self, city: NewCity) -> AppResult<City>;

    async fn update_city(&self, id: i32, city: NewCity) -> AppResult<City>;

    async fn delete_city(&self, id: i32) -> AppResult<()>;
}

pub struct CityManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CityManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_unique(&self, city: &NewCity, current: Option<i32>) -> AppResult<()> {
        let existing = self
            .uow
            .cities()
            .find_by_name_and_zipcode(&city.name, &city.zipcode)
            .await?;

        match existing {
            Some(found) if Some(found.id) != current => {
                Err(AppError::AlreadyExists(Resource::City))
            }
            _ => Ok(()),
        }
    }
}

fn normalize(city: NewCity) -> NewCity {
    NewCity {
        name: city.name.trim().to_string(),
        zipcode: city.zipcode.trim().to_string(),
    }
}

#[async_trait]
impl<U: UnitOfWork> CityService for CityManager<U> {
    async fn list_cities(&self) -> AppResult<Vec<City>> {
        Ok(self.uow.cities().find_all().await?)
    }

    async fn get_city(&self, id: i32) -> AppResult<City> {
        self.uow
            .cities()
            .find_by_id(id)
            .await?
            .ok_or_not_found(Resource::City)
    }

    async fn create_city(&self, city: NewCity) -> AppResult<City> {
        let city = normalize(city);
        self.ensure_unique(&city, None).await?;

        Ok(self.uow.cities().create(city).await?)
    }

    async fn update_city(&self, id: i32, city: NewCity) -> AppResult<City> {
        let city = normalize(city);
        self.ensure_unique(&city, Some(id)).await?;

        self.uow
            .cities()
            .update(id, city)
            .await?
            .ok_or_not_found(Resource::City)
    }

    async fn delete_city(&self, id: i32) -> AppResult<()> {
        if !self.uow.cities().delete(id).await? {
            return Err(AppError::NotFound(Resource::City));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::MockRepos;
    use mockall::predicate::eq;

    fn nantes() -> NewCity {
        NewCity {
            name: "Nantes".to_string(),
            zipcode: "44000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_city() {
        let mut repos = MockRepos::new();
        repos
            .cities
            .expect_find_by_name_and_zipcode()
            .with(eq("Nantes"), eq("44000"))
            .returning(|_, _| Ok(None));
        repos.cities.expect_create().returning(|city| {
            Ok(City {
                id: 1,
                name: city.name,
                zipcode: city.zipcode,
            })
        });

        let service = CityManager::new(repos.into_uow());
        let city = service
            .create_city(NewCity {
                name: " Nantes ".to_string(),
                zipcode: "44000".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(city.name, "Nantes");
    }

    #[tokio::test]
    async fn test_create_duplicate_city() {
        let mut repos = MockRepos::new();
        repos
            .cities
            .expect_find_by_name_and_zipcode()
            .returning(|name, zipcode| {
                Ok(Some(City {
                    id: 5,
                    name: name.to_string(),
                    zipcode: zipcode.to_string(),
                }))
            });
        repos.cities.expect_create().never();

        let service = CityManager::new(repos.into_uow());
        let result = service.create_city(nantes()).await;

        assert!(matches!(result, Err(AppError::AlreadyExists(Resource::City))));
    }

    #[tokio::test]
    async fn test_update_missing_city() {
        let mut repos = MockRepos::new();
        repos
            .cities
            .expect_find_by_name_and_zipcode()
            .returning(|_, _| Ok(None));
        repos.cities.expect_update().returning(|_, _| Ok(None));

        let service = CityManager::new(repos.into_uow());
        let result = service.update_city(12, nantes()).await;

        assert!(matches!(result, Err(AppError::NotFound(Resource::City))));
    }
}
