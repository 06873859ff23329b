//! Travel repository.
//!
//! Every returned travel carries `booked_seats`, the number of standing
//! (pending or accepted) inscriptions, counted in one grouped query per
//! call.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::base::fetch_page;
use super::entities::inscription::{self, Entity as InscriptionEntity};
use super::entities::travel::{self, ActiveModel, Entity as TravelEntity};
use crate::domain::{InscriptionStatus, NewTravel, Travel, TravelFilters, TravelUpdate};
use crate::errors::{DbResultExt, RepoResult};
use crate::types::{Page, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TravelRepository: Send + Sync {
    /// Page of travels matching the filters, soonest first
    async fn find_all(
        &self,
        filters: &TravelFilters,
        params: &PaginationParams,
    ) -> RepoResult<Page<Travel>>;

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Travel>>;

    /// Travels offered by a driver
    async fn find_by_driver(&self, driver_id: i32) -> RepoResult<Vec<Travel>>;

    async fn create(&self, travel: NewTravel) -> RepoResult<Travel>;

    async fn update(&self, id: i32, update: TravelUpdate) -> RepoResult<Option<Travel>>;

    async fn delete(&self, id: i32) -> RepoResult<bool>;
}

pub struct TravelStore {
    db: Arc<DatabaseConnection>,
}

impl TravelStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Standing inscriptions per travel id
    async fn booked_seats(&self, travel_ids: &[i32]) -> RepoResult<HashMap<i32, i32>> {
        if travel_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let active: Vec<&str> = InscriptionStatus::ACTIVE
            .iter()
            .map(InscriptionStatus::as_str)
            .collect();

        let rows: Vec<(i32, i64)> = InscriptionEntity::find()
            .select_only()
            .column(inscription::Column::TravelId)
            .column_as(Expr::col(inscription::Column::Id).count(), "booked")
            .filter(inscription::Column::TravelId.is_in(travel_ids.to_vec()))
            .filter(inscription::Column::Status.is_in(active))
            .group_by(inscription::Column::TravelId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .context("travel.bookedSeats")?;

        Ok(rows
            .into_iter()
            .map(|(travel_id, booked)| (travel_id, i32::try_from(booked).unwrap_or(i32::MAX)))
            .collect())
    }

    async fn with_booked_seats(&self, models: Vec<travel::Model>) -> RepoResult<Vec<Travel>> {
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let booked = self.booked_seats(&ids).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let seats = booked.get(&m.id).copied().unwrap_or(0);
                m.into_domain(seats)
            })
            .collect())
    }

    async fn find_model(&self, id: i32) -> RepoResult<Option<travel::Model>> {
        TravelEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("travel.findById")
    }
}

#[async_trait]
impl TravelRepository for TravelStore {
    async fn find_all(
        &self,
        filters: &TravelFilters,
        params: &PaginationParams,
    ) -> RepoResult<Page<Travel>> {
        let mut query = TravelEntity::find().order_by_asc(travel::Column::Date);

        if let Some(departure) = filters.departure_city_id {
            query = query.filter(travel::Column::DepartureCityId.eq(departure));
        }
        if let Some(arrival) = filters.arrival_city_id {
            query = query.filter(travel::Column::ArrivalCityId.eq(arrival));
        }
        if let Some(start) = filters.date.and_then(|day| day.and_hms_opt(0, 0, 0)) {
            let start = start.and_utc();
            query = query
                .filter(travel::Column::Date.gte(start))
                .filter(travel::Column::Date.lt(start + Duration::days(1)));
        }

        let page = fetch_page(query, self.db.as_ref(), params, "travel.findAll").await?;
        let items = self.with_booked_seats(page.items).await?;

        Ok(Page::new(items, page.total))
    }

    async fn find_by_id(&self, id: i32) -> RepoResult<Option<Travel>> {
        let Some(model) = self.find_model(id).await? else {
            return Ok(None);
        };

        Ok(self.with_booked_seats(vec![model]).await?.pop())
    }

    async fn find_by_driver(&self, driver_id: i32) -> RepoResult<Vec<Travel>> {
        let models = TravelEntity::find()
            .filter(travel::Column::DriverId.eq(driver_id))
            .order_by_asc(travel::Column::Date)
            .all(self.db.as_ref())
            .await
            .context("travel.findByDriver")?;

        self.with_booked_seats(models).await
    }

    async fn create(&self, new_travel: NewTravel) -> RepoResult<Travel> {
        let active_model = ActiveModel {
            id: NotSet,
            date: Set(new_travel.date),
            kms: Set(new_travel.kms),
            available_seats: Set(new_travel.available_seats),
            driver_id: Set(new_travel.driver_id),
            car_id: Set(new_travel.car_id),
            departure_city_id: Set(new_travel.departure_city_id),
            arrival_city_id: Set(new_travel.arrival_city_id),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(self.db.as_ref()).await.context("travel.create")?;
        Ok(model.into_domain(0))
    }

    async fn update(&self, id: i32, update: TravelUpdate) -> RepoResult<Option<Travel>> {
        let Some(existing) = self.find_model(id).await? else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        if let Some(date) = update.date {
            active.date = Set(date);
        }
        if let Some(kms) = update.kms {
            active.kms = Set(kms);
        }
        if let Some(seats) = update.available_seats {
            active.available_seats = Set(seats);
        }
        if let Some(car_id) = update.car_id {
            active.car_id = Set(car_id);
        }

        let model = active.update(self.db.as_ref()).await.context("travel.update")?;
        Ok(self.with_booked_seats(vec![model]).await?.pop())
    }

    async fn delete(&self, id: i32) -> RepoResult<bool> {
        let result = TravelEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .context("travel.delete")?;

        Ok(result.rows_affected > 0)
    }
}
