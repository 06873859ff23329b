//! Brand, model and color handlers. Reads are public, writes admin only.

use axum::{
    extract::{Extension, Path, Query, State},
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
use crate::config::HEX_COLOR_PATTERN;
use crate::domain::{Brand, Color, Model, NewColor, NewModel};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, NoContent};

static HEX_COLOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(HEX_COLOR_PATTERN).expect("color pattern is a valid regex"));

#[derive(Debug, Deserialize, Validate)]
pub struct BrandRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ModelRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    pub brand_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ColorRequest {
    #[validate(length(min = 1, max = 50, message = "Name is required"))]
    pub name: String,
    #[validate(regex(path = *HEX_COLOR_REGEX, message = "Color must be #RRGGBB"))]
    pub hex: String,
}

#[derive(Debug, Deserialize)]
pub struct ModelQuery {
    pub brand_id: Option<i32>,
}

pub fn brand_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_brands))
        .route("/:id", get(get_brand));
    let admin = Router::new()
        .route("/", post(create_brand))
        .route("/:id", put(update_brand).delete(delete_brand));

    public.merge(authenticated(state, admin))
}

pub fn model_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_models))
        .route("/:id", get(get_model));
    let admin = Router::new()
        .route("/", post(create_model))
        .route("/:id", put(update_model).delete(delete_model));

    public.merge(authenticated(state, admin))
}

pub fn color_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_colors))
        .route("/:id", get(get_color));
    let admin = Router::new()
        .route("/", post(create_color))
        .route("/:id", put(update_color).delete(delete_color));

    public.merge(authenticated(state, admin))
}

// Brands

pub async fn list_brands(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Brand>>> {
    let brands = state.services.catalog().list_brands().await?;
    Ok(ApiResponse::success(brands))
}

pub async fn get_brand(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<Brand>> {
    let brand = state.services.catalog().get_brand(id).await?;
    Ok(ApiResponse::success(brand))
}

pub async fn create_brand(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<BrandRequest>,
) -> AppResult<Created<Brand>> {
    require_admin(&current_user)?;
    let brand = state.services.catalog().create_brand(payload.name).await?;
    Ok(Created(brand))
}

pub async fn update_brand(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<BrandRequest>,
) -> AppResult<ApiResponse<Brand>> {
    require_admin(&current_user)?;
    let brand = state
        .services
        .catalog()
        .update_brand(id, payload.name)
        .await?;
    Ok(ApiResponse::success(brand))
}

pub async fn delete_brand(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;
    state.services.catalog().delete_brand(id).await?;
    Ok(NoContent)
}

// Models

pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ModelQuery>,
) -> AppResult<ApiResponse<Vec<Model>>> {
    let models = state.services.catalog().list_models(query.brand_id).await?;
    Ok(ApiResponse::success(models))
}

pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<Model>> {
    let model = state.services.catalog().get_model(id).await?;
    Ok(ApiResponse::success(model))
}

pub async fn create_model(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ModelRequest>,
) -> AppResult<Created<Model>> {
    require_admin(&current_user)?;
    let model = state
        .services
        .catalog()
        .create_model(NewModel {
            name: payload.name,
            brand_id: payload.brand_id,
        })
        .await?;
    Ok(Created(model))
}

pub async fn update_model(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ModelRequest>,
) -> AppResult<ApiResponse<Model>> {
    require_admin(&current_user)?;
    let model = state
        .services
        .catalog()
        .update_model(
            id,
            NewModel {
                name: payload.name,
                brand_id: payload.brand_id,
            },
        )
        .await?;
    Ok(ApiResponse::success(model))
}

pub async fn delete_model(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;
    state.services.catalog().delete_model(id).await?;
    Ok(NoContent)
}

// Colors

pub async fn list_colors(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Color>>> {
    let colors = state.services.catalog().list_colors().await?;
    Ok(ApiResponse::success(colors))
}

pub async fn get_color(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<Color>> {
    let color = state.services.catalog().get_color(id).await?;
    Ok(ApiResponse::success(color))
}

pub async fn create_color(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ColorRequest>,
) -> AppResult<Created<Color>> {
    require_admin(&current_user)?;
    let color = state
        .services
        .catalog()
        .create_color(NewColor {
            name: payload.name,
            hex: payload.hex,
        })
        .await?;
    Ok(Created(color))
}

pub async fn update_color(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ColorRequest>,
) -> AppResult<ApiResponse<Color>> {
    require_admin(&current_user)?;
    let color = state
        .services
        .catalog()
        .update_color(
            id,
            NewColor {
                name: payload.name,
                hex: payload.hex,
            },
        )
        .await?;
    Ok(ApiResponse::success(color))
}

pub async fn delete_color(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;
    state.services.catalog().delete_color(id).await?;
    Ok(NoContent)
}
