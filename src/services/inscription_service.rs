//! Inscription service - passengers booking seats on travels.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::Actor;
use crate::domain::{Inscription, InscriptionStatus, NewInscription, Travel};
use crate::errors::registry::{INSCRIPTION_CLOSED, NO_SEATS_AVAILABLE, SELF_INSCRIPTION};
use crate::errors::{AppError, AppResult, OptionExt, Resource};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait InscriptionService: Send + Sync {
    /// Book a seat on `travel_id` for the actor
    async fn inscribe(&self, actor: Actor, travel_id: i32) -> AppResult<Inscription>;

    async fn list_mine(&self, actor: Actor) -> AppResult<Vec<Inscription>>;

    /// Passengers of a travel, for its driver or an admin
    async fn list_by_travel(&self, actor: Actor, travel_id: i32) -> AppResult<Vec<Inscription>>;

    async fn cancel(&self, actor: Actor, id: i32) -> AppResult<Inscription>;
}

pub struct InscriptionManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> InscriptionManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn travel(&self, id: i32) -> AppResult<Travel> {
        self.uow
            .travels()
            .find_by_id(id)
            .await?
            .ok_or_not_found(Resource::Travel)
    }

    /// User account behind the driver offering `travel`
    async fn travel_owner(&self, travel: &Travel) -> AppResult<i32> {
        let driver = self
            .uow
            .drivers()
            .find_by_id(travel.driver_id)
            .await?
            .ok_or_not_found(Resource::Driver)?;
        Ok(driver.user_id)
    }
}

#[async_trait]
impl<U: UnitOfWork> InscriptionService for InscriptionManager<U> {
    async fn inscribe(&self, actor: Actor, travel_id: i32) -> AppResult<Inscription> {
        let travel = self.travel(travel_id).await?;
        if travel.has_departed(Utc::now()) {
            return Err(AppError::rule(
                INSCRIPTION_CLOSED,
                "Travel has already departed",
            ));
        }

        if self.travel_owner(&travel).await? == actor.user_id {
            return Err(AppError::rule(
                SELF_INSCRIPTION,
                "Drivers cannot book their own travel",
            ));
        }

        let inscriptions = self.uow.inscriptions();
        if inscriptions
            .find_by_user_and_travel(actor.user_id, travel_id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists(Resource::Inscription));
        }

        let booked = inscriptions.count_active_by_travel(travel_id).await?;
        if booked >= travel.available_seats.max(0) as u64 {
            return Err(AppError::rule(
                NO_SEATS_AVAILABLE,
                "No seats left on this travel",
            ));
        }

        let inscription = inscriptions
            .create(NewInscription {
                user_id: actor.user_id,
                travel_id,
            })
            .await?;

        tracing::info!(
            inscription_id = inscription.id,
            travel_id,
            user_id = actor.user_id,
            "Seat booked"
        );
        Ok(inscription)
    }

    async fn list_mine(&self, actor: Actor) -> AppResult<Vec<Inscription>> {
        Ok(self.uow.inscriptions().find_by_user(actor.user_id).await?)
    }

    async fn list_by_travel(&self, actor: Actor, travel_id: i32) -> AppResult<Vec<Inscription>> {
        let travel = self.travel(travel_id).await?;
        if !actor.is_admin() {
            actor.ensure_owner_or_admin(self.travel_owner(&travel).await?)?;
        }

        Ok(self.uow.inscriptions().find_by_travel(travel_id).await?)
    }

    async fn cancel(&self, actor: Actor, id: i32) -> AppResult<Inscription> {
        let inscription = self
            .uow
            .inscriptions()
            .find_by_id(id)
            .await?
            .ok_or_not_found(Resource::Inscription)?;
        actor.ensure_owner_or_admin(inscription.user_id)?;

        if !inscription.status.is_active() {
            return Err(AppError::rule(
                INSCRIPTION_CLOSED,
                format!("Inscription is already {}", inscription.status),
            ));
        }

        self.uow
            .inscriptions()
            .update_status(id, InscriptionStatus::Cancelled)
            .await?
            .ok_or_not_found(Resource::Inscription)
    }
}
