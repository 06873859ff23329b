//! Driver handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::handlers::travel_handler::TravelResponse;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::Driver;
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, NoContent, Paginated, PaginationParams};

#[derive(Debug, Deserialize, Validate)]
pub struct DriverLicenseRequest {
    #[validate(length(min = 4, max = 50, message = "Invalid driver license"))]
    pub driver_license: String,
}

/// Create driver routes (mounted behind the auth middleware)
pub fn driver_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers).post(become_driver))
        .route("/me", get(my_driver))
        .route(
            "/:id",
            get(get_driver).put(update_license).delete(delete_driver),
        )
        .route("/:id/travels", get(driver_travels))
}

pub async fn list_drivers(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Paginated<Driver>> {
    let page = state.services.drivers().list_drivers(params).await?;
    Ok(Paginated::new(page, &params))
}

/// Register the authenticated user as a driver
pub async fn become_driver(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<DriverLicenseRequest>,
) -> AppResult<Created<Driver>> {
    let driver = state
        .services
        .drivers()
        .become_driver(current_user.id, payload.driver_license)
        .await?;

    Ok(Created(driver))
}

pub async fn my_driver(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Driver>> {
    let driver = state
        .services
        .drivers()
        .get_driver_by_user(current_user.id)
        .await?;
    Ok(ApiResponse::success(driver))
}

pub async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<Driver>> {
    let driver = state.services.drivers().get_driver(id).await?;
    Ok(ApiResponse::success(driver))
}

/// Change the license number (driver or admin)
pub async fn update_license(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<DriverLicenseRequest>,
) -> AppResult<ApiResponse<Driver>> {
    let driver = state
        .services
        .drivers()
        .update_license(current_user.actor(), id, payload.driver_license)
        .await?;
    Ok(ApiResponse::success(driver))
}

pub async fn delete_driver(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;

    state.services.drivers().delete_driver(id).await?;
    Ok(NoContent)
}

pub async fn driver_travels(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<Vec<TravelResponse>>> {
    let travels = state.services.travels().list_by_driver(id).await?;
    Ok(ApiResponse::success(
        travels.into_iter().map(TravelResponse::from).collect(),
    ))
}
