//! Travel handlers. Searching and reading are public.

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{authenticated, CurrentUser};
use crate::api::AppState;
use crate::domain::{Inscription, Travel, TravelFilters, TravelUpdate};
use crate::errors::AppResult;
use crate::services::TravelInput;
use crate::types::{ApiResponse, Created, NoContent, Paginated, PaginationParams};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTravelRequest {
    pub date: DateTime<Utc>,
    #[validate(range(min = 1, message = "Distance must be positive"))]
    pub kms: i32,
    pub available_seats: i32,
    pub car_id: i32,
    pub departure_city_id: i32,
    pub arrival_city_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTravelRequest {
    pub date: Option<DateTime<Utc>>,
    #[validate(range(min = 1, message = "Distance must be positive"))]
    pub kms: Option<i32>,
    pub available_seats: Option<i32>,
    pub car_id: Option<i32>,
}

/// Travel with the seats still bookable
#[derive(Debug, Serialize)]
pub struct TravelResponse {
    #[serde(flatten)]
    pub travel: Travel,
    pub remaining_seats: i32,
}

impl From<Travel> for TravelResponse {
    fn from(travel: Travel) -> Self {
        Self {
            remaining_seats: travel.remaining_seats(),
            travel,
        }
    }
}

pub fn travel_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_travels))
        .route("/:id", get(get_travel));
    let protected = Router::new()
        .route("/", post(create_travel))
        .route("/:id", put(update_travel).delete(delete_travel))
        .route("/:id/inscriptions", get(travel_inscriptions));

    public.merge(authenticated(state, protected))
}

/// Search by departure, arrival and day
pub async fn list_travels(
    State(state): State<AppState>,
    Query(filters): Query<TravelFilters>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Paginated<TravelResponse>> {
    let page = state
        .services
        .travels()
        .list_travels(filters, params)
        .await?;
    Ok(Paginated::new(page.map(TravelResponse::from), &params))
}

pub async fn get_travel(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<TravelResponse>> {
    let travel = state.services.travels().get_travel(id).await?;
    Ok(ApiResponse::success(travel.into()))
}

pub async fn create_travel(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTravelRequest>,
) -> AppResult<Created<TravelResponse>> {
    let input = TravelInput {
        date: payload.date,
        kms: payload.kms,
        available_seats: payload.available_seats,
        car_id: payload.car_id,
        departure_city_id: payload.departure_city_id,
        arrival_city_id: payload.arrival_city_id,
    };
    let travel = state
        .services
        .travels()
        .create_travel(current_user.actor(), input)
        .await?;
    Ok(Created(travel.into()))
}

pub async fn update_travel(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateTravelRequest>,
) -> AppResult<ApiResponse<TravelResponse>> {
    let update = TravelUpdate {
        date: payload.date,
        kms: payload.kms,
        available_seats: payload.available_seats,
        car_id: payload.car_id,
    };
    let travel = state
        .services
        .travels()
        .update_travel(current_user.actor(), id, update)
        .await?;
    Ok(ApiResponse::success(travel.into()))
}

pub async fn delete_travel(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    state
        .services
        .travels()
        .delete_travel(current_user.actor(), id)
        .await?;
    Ok(NoContent)
}

/// Passengers of a travel (its driver or an admin)
pub async fn travel_inscriptions(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<Vec<Inscription>>> {
    let inscriptions = state
        .services
        .inscriptions()
        .list_by_travel(current_user.actor(), id)
        .await?;
    Ok(ApiResponse::success(inscriptions))
}
