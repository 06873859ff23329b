//! Car handlers. Every route requires authentication.

use axum::{
    extract::{Extension, Path, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Car, CarUpdate};
use crate::errors::AppResult;
use crate::services::CarInput;
use crate::types::{ApiResponse, Created, NoContent, Paginated, PaginationParams};

/// Plate format is checked by the service after normalization
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCarRequest {
    #[validate(length(min = 9, max = 12, message = "Plate must look like AB-123-CD"))]
    pub immat: String,
    pub model_id: i32,
    pub color_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCarRequest {
    #[validate(length(min = 9, max = 12, message = "Plate must look like AB-123-CD"))]
    pub immat: Option<String>,
    pub model_id: Option<i32>,
    pub color_id: Option<i32>,
}

pub fn car_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars).post(create_car))
        .route("/:id", get(get_car).put(update_car).delete(delete_car))
}

/// Own cars, or every car for admins
pub async fn list_cars(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Paginated<Car>> {
    let page = state
        .services
        .cars()
        .list_cars(current_user.actor(), params)
        .await?;
    Ok(Paginated::new(page, &params))
}

pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<Car>> {
    let car = state.services.cars().get_car(id).await?;
    Ok(ApiResponse::success(car))
}

pub async fn create_car(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCarRequest>,
) -> AppResult<Created<Car>> {
    let input = CarInput {
        immat: payload.immat,
        model_id: payload.model_id,
        color_id: payload.color_id,
    };
    let car = state
        .services
        .cars()
        .create_car(current_user.actor(), input)
        .await?;
    Ok(Created(car))
}

pub async fn update_car(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateCarRequest>,
) -> AppResult<ApiResponse<Car>> {
    let update = CarUpdate {
        immat: payload.immat,
        model_id: payload.model_id,
        color_id: payload.color_id,
    };
    let car = state
        .services
        .cars()
        .update_car(current_user.actor(), id, update)
        .await?;
    Ok(ApiResponse::success(car))
}

pub async fn delete_car(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    state
        .services
        .cars()
        .delete_car(current_user.actor(), id)
        .await?;
    Ok(NoContent)
}
