//! Car service - cars registered by drivers.

use async_trait::async_trait;
use std::sync::Arc;

use super::Actor;
use crate::domain::{normalize_immat, Car, CarUpdate, Driver, NewCar};
use crate::errors::registry::NOT_A_DRIVER;
use crate::errors::{AppError, AppResult, OptionExt, Resource};
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

/// Car fields chosen by the driver; the owner comes from the caller
#[derive(Debug, Clone, PartialEq)]
pub struct CarInput {
    pub immat: String,
    pub model_id: i32,
    pub color_id: i32,
}

#[async_trait]
pub trait CarService: Send + Sync {
    /// Admins see every car, drivers their own
    async fn list_cars(&self, actor: Actor, params: PaginationParams) -> AppResult<Page<Car>>;

    async fn get_car(&self, id: i32) -> AppResult<Car>;

    async fn create_car(&self, actor: Actor, input: CarInput) -> AppResult<Car>;

    async fn update_car(&self, actor: Actor, id: i32, update: CarUpdate) -> AppResult<Car>;

    async fn delete_car(&self, actor: Actor, id: i32) -> AppResult<()>;
}

pub struct CarManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CarManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn driver_of(&self, actor: Actor) -> AppResult<Driver> {
        self.uow
            .drivers()
            .find_by_user_id(actor.user_id)
            .await?
            .ok_or_else(|| AppError::rule(NOT_A_DRIVER, "Only drivers can manage cars"))
    }

    /// Load a car the actor may modify
    async fn owned_car(&self, actor: Actor, id: i32) -> AppResult<Car> {
        let car = self.get_car(id).await?;
        if actor.is_admin() {
            return Ok(car);
        }

        let driver = self.driver_of(actor).await?;
        if !car.is_owned_by(driver.id) {
            return Err(AppError::Forbidden);
        }
        Ok(car)
    }

    async fn checked_immat(&self, raw: &str, current: Option<i32>) -> AppResult<String> {
        let immat = normalize_immat(raw)
            .ok_or_else(|| AppError::validation("Plate must look like AB-123-CD"))?;

        match self.uow.cars().find_by_immat(&immat).await? {
            Some(car) if Some(car.id) != current => Err(AppError::AlreadyExists(Resource::Car)),
            _ => Ok(immat),
        }
    }

    async fn ensure_model_and_color(
        &self,
        model_id: Option<i32>,
        color_id: Option<i32>,
    ) -> AppResult<()> {
        if let Some(model_id) = model_id {
            self.uow
                .models()
                .find_by_id(model_id)
                .await?
                .ok_or_not_found(Resource::Model)?;
        }
        if let Some(color_id) = color_id {
            self.uow
                .colors()
                .find_by_id(color_id)
                .await?
                .ok_or_not_found(Resource::Color)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> CarService for CarManager<U> {
    async fn list_cars(&self, actor: Actor, params: PaginationParams) -> AppResult<Page<Car>> {
        if actor.is_admin() {
            return Ok(self.uow.cars().find_all(&params).await?);
        }

        let driver = self.driver_of(actor).await?;
        let cars = self.uow.cars().find_by_driver(driver.id).await?;
        let total = cars.len() as u64;
        let items = cars
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect();

        Ok(Page::new(items, total))
    }

    async fn get_car(&self, id: i32) -> AppResult<Car> {
        self.uow
            .cars()
            .find_by_id(id)
            .await?
            .ok_or_not_found(Resource::Car)
    }

    async fn create_car(&self, actor: Actor, input: CarInput) -> AppResult<Car> {
        let driver = self.driver_of(actor).await?;
        let immat = self.checked_immat(&input.immat, None).await?;
        self.ensure_model_and_color(Some(input.model_id), Some(input.color_id))
            .await?;

        let car = self
            .uow
            .cars()
            .create(NewCar {
                immat,
                model_id: input.model_id,
                color_id: input.color_id,
                driver_id: driver.id,
            })
            .await?;

        tracing::info!(car_id = car.id, driver_id = driver.id, "Car registered");
        Ok(car)
    }

    async fn update_car(&self, actor: Actor, id: i32, update: CarUpdate) -> AppResult<Car> {
        self.owned_car(actor, id).await?;

        let immat = match update.immat.as_deref() {
            Some(raw) => Some(self.checked_immat(raw, Some(id)).await?),
            None => None,
        };
        self.ensure_model_and_color(update.model_id, update.color_id)
            .await?;

        self.uow
            .cars()
            .update(id, CarUpdate { immat, ..update })
            .await?
            .ok_or_not_found(Resource::Car)
    }

    async fn delete_car(&self, actor: Actor, id: i32) -> AppResult<()> {
        self.owned_car(actor, id).await?;

        if !self.uow.cars().delete(id).await? {
            return Err(AppError::NotFound(Resource::Car));
        }
        Ok(())
    }
}
