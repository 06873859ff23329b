//! Inscription handlers. Every route requires authentication.

use axum::{
    extract::{Extension, Path, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::Inscription;
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created};

#[derive(Debug, Deserialize, Validate)]
pub struct InscriptionRequest {
    #[validate(range(min = 1, message = "Invalid travel"))]
    pub travel_id: i32,
}

pub fn inscription_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(inscribe))
        .route("/me", get(my_inscriptions))
        .route("/:id/cancel", post(cancel))
}

/// Book a seat for the authenticated user
pub async fn inscribe(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<InscriptionRequest>,
) -> AppResult<Created<Inscription>> {
    let inscription = state
        .services
        .inscriptions()
        .inscribe(current_user.actor(), payload.travel_id)
        .await?;
    Ok(Created(inscription))
}

pub async fn my_inscriptions(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<Inscription>>> {
    let inscriptions = state
        .services
        .inscriptions()
        .list_mine(current_user.actor())
        .await?;
    Ok(ApiResponse::success(inscriptions))
}

pub async fn cancel(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<Inscription>> {
    let inscription = state
        .services
        .inscriptions()
        .cancel(current_user.actor(), id)
        .await?;
    Ok(ApiResponse::success(inscription))
}
