//! City handlers. Reads are public, writes admin only.

use axum::{
    extract::{Extension, Path, State},
    routing::{get, post, put},
    Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{authenticated, require_admin, CurrentUser};
use crate::api::AppState;
use crate::config::ZIPCODE_PATTERN;
use crate::domain::{City, NewCity};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, NoContent};

static ZIPCODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(ZIPCODE_PATTERN).expect("zipcode pattern is a valid regex"));

#[derive(Debug, Deserialize, Validate)]
pub struct CityRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(regex(path = *ZIPCODE_REGEX, message = "Zipcode must be 5 digits"))]
    pub zipcode: String,
}

impl From<CityRequest> for NewCity {
    fn from(request: CityRequest) -> Self {
        NewCity {
            name: request.name,
            zipcode: request.zipcode,
        }
    }
}

pub fn city_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_cities))
        .route("/:id", get(get_city));
    let admin = Router::new()
        .route("/", post(create_city))
        .route("/:id", put(update_city).delete(delete_city));

    public.merge(authenticated(state, admin))
}

pub async fn list_cities(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<City>>> {
    let cities = state.services.cities().list_cities().await?;
    Ok(ApiResponse::success(cities))
}

pub async fn get_city(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<City>> {
    let city = state.services.cities().get_city(id).await?;
    Ok(ApiResponse::success(city))
}

pub async fn create_city(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CityRequest>,
) -> AppResult<Created<City>> {
    require_admin(&current_user)?;
    let city = state.services.cities().create_city(payload.into()).await?;
    Ok(Created(city))
}

pub async fn update_city(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<CityRequest>,
) -> AppResult<ApiResponse<City>> {
    require_admin(&current_user)?;
    let city = state
        .services
        .cities()
        .update_city(id, payload.into())
        .await?;
    Ok(ApiResponse::success(city))
}

pub async fn delete_city(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;
    state.services.cities().delete_city(id).await?;
    Ok(NoContent)
}
