//! Travel service - trips offered by drivers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::Actor;
use crate::config::MAX_TRAVEL_SEATS;
use crate::domain::{Driver, NewTravel, Travel, TravelFilters, TravelUpdate};
use crate::errors::registry::{INVALID_TRAVEL, NOT_A_DRIVER};
use crate::errors::{AppError, AppResult, OptionExt, Resource};
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

/// Travel fields chosen by the driver
#[derive(Debug, Clone, PartialEq)]
pub struct TravelInput {
    pub date: DateTime<Utc>,
    pub kms: i32,
    pub available_seats: i32,
    pub car_id: i32,
    pub departure_city_id: i32,
    pub arrival_city_id: i32,
}

#[async_trait]
pub trait TravelService: Send + Sync {
    async fn list_travels(
        &self,
        filters: TravelFilters,
        params: PaginationParams,
    ) -> AppResult<Page<Travel>>;

    async fn get_travel(&self, id: i32) -> AppResult<Travel>;

    async fn list_by_driver(&self, driver_id: i32) -> AppResult<Vec<Travel>>;

    async fn create_travel(&self, actor: Actor, input: TravelInput) -> AppResult<Travel>;

    /// Only the driver who offers the travel may change it
    async fn update_travel(&self, actor: Actor, id: i32, update: TravelUpdate)
        -> AppResult<Travel>;

    async fn delete_travel(&self, actor: Actor, id: i32) -> AppResult<()>;
}

pub struct TravelManager<U: UnitOfWork> {
    uow: Arc<U>,
}

fn invalid(message: &str) -> AppError {
    AppError::rule(INVALID_TRAVEL, message)
}

fn check_seats(seats: i32) -> AppResult<()> {
    if (1..=MAX_TRAVEL_SEATS).contains(&seats) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Available seats must be between 1 and {}",
            MAX_TRAVEL_SEATS
        )))
    }
}

fn check_date(date: DateTime<Utc>) -> AppResult<()> {
    if date <= Utc::now() {
        return Err(invalid("Travel date must be in the future"));
    }
    Ok(())
}

impl<U: UnitOfWork> TravelManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn driver_of(&self, actor: Actor) -> AppResult<Option<Driver>> {
        Ok(self.uow.drivers().find_by_user_id(actor.user_id).await?)
    }

    async fn ensure_own_car(&self, driver: &Driver, car_id: i32) -> AppResult<()> {
        let car = self
            .uow
            .cars()
            .find_by_id(car_id)
            .await?
            .ok_or_not_found(Resource::Car)?;

        if !car.is_owned_by(driver.id) {
            return Err(AppError::Forbidden);
        }
        Ok(())
    }

    async fn ensure_city(&self, id: i32) -> AppResult<()> {
        self.uow
            .cities()
            .find_by_id(id)
            .await?
            .ok_or_not_found(Resource::City)
            .map(|_| ())
    }
}

#[async_trait]
impl<U: UnitOfWork> TravelService for TravelManager<U> {
    async fn list_travels(
        &self,
        filters: TravelFilters,
        params: PaginationParams,
    ) -> AppResult<Page<Travel>> {
        Ok(self.uow.travels().find_all(&filters, &params).await?)
    }

    async fn get_travel(&self, id: i32) -> AppResult<Travel> {
        self.uow
            .travels()
            .find_by_id(id)
            .await?
            .ok_or_not_found(Resource::Travel)
    }

    async fn list_by_driver(&self, driver_id: i32) -> AppResult<Vec<Travel>> {
        Ok(self.uow.travels().find_by_driver(driver_id).await?)
    }

    async fn create_travel(&self, actor: Actor, input: TravelInput) -> AppResult<Travel> {
        let driver = self
            .driver_of(actor)
            .await?
            .ok_or_else(|| AppError::rule(NOT_A_DRIVER, "Only drivers can offer travels"))?;

        if input.departure_city_id == input.arrival_city_id {
            return Err(invalid("Departure and arrival cities must differ"));
        }
        check_date(input.date)?;
        check_seats(input.available_seats)?;

        self.ensure_own_car(&driver, input.car_id).await?;
        self.ensure_city(input.departure_city_id).await?;
        self.ensure_city(input.arrival_city_id).await?;

        let travel = self
            .uow
            .travels()
            .create(NewTravel {
                date: input.date,
                kms: input.kms,
                available_seats: input.available_seats,
                driver_id: driver.id,
                car_id: input.car_id,
                departure_city_id: input.departure_city_id,
                arrival_city_id: input.arrival_city_id,
            })
            .await?;

        tracing::info!(travel_id = travel.id, driver_id = driver.id, "Travel created");
        Ok(travel)
    }

    async fn update_travel(
        &self,
        actor: Actor,
        id: i32,
        update: TravelUpdate,
    ) -> AppResult<Travel> {
        let travel = self.get_travel(id).await?;
        let driver = self
            .driver_of(actor)
            .await?
            .filter(|driver| driver.id == travel.driver_id)
            .ok_or(AppError::Forbidden)?;

        if let Some(date) = update.date {
            check_date(date)?;
        }
        if let Some(seats) = update.available_seats {
            check_seats(seats)?;
            if seats < travel.booked_seats {
                return Err(invalid("Seats cannot drop below the current bookings"));
            }
        }
        if let Some(car_id) = update.car_id {
            self.ensure_own_car(&driver, car_id).await?;
        }

        self.uow
            .travels()
            .update(id, update)
            .await?
            .ok_or_not_found(Resource::Travel)
    }

    async fn delete_travel(&self, actor: Actor, id: i32) -> AppResult<()> {
        let travel = self.get_travel(id).await?;

        if !actor.is_admin() {
            let owns = self
                .driver_of(actor)
                .await?
                .is_some_and(|driver| driver.id == travel.driver_id);
            if !owns {
                return Err(AppError::Forbidden);
            }
        }

        if !self.uow.travels().delete(id).await? {
            return Err(AppError::NotFound(Resource::Travel));
        }

        tracing::info!(travel_id = id, "Travel deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{City, Role};
    use crate::services::testing::{self, MockRepos};
    use chrono::Duration;

    fn input() -> TravelInput {
        TravelInput {
            date: Utc::now() + Duration::days(2),
            kms: 380,
            available_seats: 3,
            car_id: 1,
            departure_city_id: 1,
            arrival_city_id: 2,
        }
    }

    fn driver_repos() -> MockRepos {
        let mut repos = MockRepos::new();
        repos
            .drivers
            .expect_find_by_user_id()
            .returning(|user_id| Ok(Some(testing::driver(3, user_id))));
        repos
    }

    fn driver_actor() -> Actor {
        Actor::new(5, Role::Driver)
    }

    #[tokio::test]
    async fn test_create_travel() {
        let mut repos = driver_repos();
        repos
            .cars
            .expect_find_by_id()
            .returning(|id| Ok(Some(testing::car(id, 3))));
        repos.cities.expect_find_by_id().times(2).returning(|id| {
            Ok(Some(City {
                id,
                name: format!("City {}", id),
                zipcode: "75001".to_string(),
            }))
        });
        repos.travels.expect_create().returning(|new| {
            let mut travel = testing::travel(11, new.driver_id, new.available_seats, 0);
            travel.date = new.date;
            Ok(travel)
        });

        let service = TravelManager::new(repos.into_uow());
        let travel = service.create_travel(driver_actor(), input()).await.unwrap();

        assert_eq!(travel.id, 11);
        assert_eq!(travel.driver_id, 3);
        assert_eq!(travel.remaining_seats(), 3);
    }

    #[tokio::test]
    async fn test_create_travel_same_cities() {
        let service = TravelManager::new(driver_repos().into_uow());
        let result = service
            .create_travel(
                driver_actor(),
                TravelInput {
                    arrival_city_id: 1,
                    ..input()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Rule { code, .. }) if code == INVALID_TRAVEL));
    }

    #[tokio::test]
    async fn test_create_travel_in_the_past() {
        let service = TravelManager::new(driver_repos().into_uow());
        let result = service
            .create_travel(
                driver_actor(),
                TravelInput {
                    date: Utc::now() - Duration::hours(1),
                    ..input()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Rule { code, .. }) if code == INVALID_TRAVEL));
    }

    #[tokio::test]
    async fn test_create_travel_seat_bounds() {
        let service = TravelManager::new(driver_repos().into_uow());

        for seats in [0, MAX_TRAVEL_SEATS + 1] {
            let result = service
                .create_travel(
                    driver_actor(),
                    TravelInput {
                        available_seats: seats,
                        ..input()
                    },
                )
                .await;
            assert!(matches!(result, Err(AppError::Validation { .. })));
        }
    }

    #[tokio::test]
    async fn test_create_travel_with_foreign_car() {
        let mut repos = driver_repos();
        repos
            .cars
            .expect_find_by_id()
            .returning(|id| Ok(Some(testing::car(id, 99))));
        repos.travels.expect_create().never();

        let service = TravelManager::new(repos.into_uow());
        let result = service.create_travel(driver_actor(), input()).await;

        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_update_seats_below_bookings() {
        let mut repos = driver_repos();
        repos
            .travels
            .expect_find_by_id()
            .returning(|id| Ok(Some(testing::travel(id, 3, 4, 3))));
        repos.travels.expect_update().never();

        let service = TravelManager::new(repos.into_uow());
        let update = TravelUpdate {
            available_seats: Some(2),
            ..Default::default()
        };
        let result = service.update_travel(driver_actor(), 1, update).await;

        assert!(matches!(result, Err(AppError::Rule { code, .. }) if code == INVALID_TRAVEL));
    }

    #[tokio::test]
    async fn test_update_by_other_driver() {
        let mut repos = driver_repos();
        repos
            .travels
            .expect_find_by_id()
            .returning(|id| Ok(Some(testing::travel(id, 42, 4, 0))));

        let service = TravelManager::new(repos.into_uow());
        let result = service
            .update_travel(driver_actor(), 1, TravelUpdate::default())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_admin_deletes_travel() {
        let mut repos = MockRepos::new();
        repos
            .travels
            .expect_find_by_id()
            .returning(|id| Ok(Some(testing::travel(id, 42, 4, 0))));
        repos.travels.expect_delete().returning(|_| Ok(true));

        let service = TravelManager::new(repos.into_uow());
        assert!(service
            .delete_travel(Actor::new(1, Role::Admin), 1)
            .await
            .is_ok());
    }
}
