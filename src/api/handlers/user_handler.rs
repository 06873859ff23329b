//! User handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, require_self_or_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{UserResponse, UserUpdate};
use crate::errors::AppResult;
use crate::types::{ApiResponse, NoContent, Paginated, PaginationParams};

/// Profile update request, every field optional
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Firstname cannot be empty"))]
    pub firstname: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Lastname cannot be empty"))]
    pub lastname: Option<String>,
    #[validate(length(min = 6, max = 20, message = "Invalid phone number"))]
    pub phone: Option<String>,
}

/// Create user routes (mounted behind the auth middleware)
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/anonymize", post(anonymize_user))
}

/// List users (admin only)
pub async fn list_users(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Paginated<UserResponse>> {
    require_admin(&current_user)?;

    let page = state.services.users().list_users(params).await?;
    Ok(Paginated::new(page.map(UserResponse::from), &params))
}

/// Get user by ID (own profile or admin)
pub async fn get_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_self_or_admin(&current_user, id)?;

    let user = state.services.users().get_user(id).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

pub async fn update_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    require_self_or_admin(&current_user, id)?;

    let update = UserUpdate {
        firstname: payload.firstname,
        lastname: payload.lastname,
        phone: payload.phone,
    };
    let user = state.services.users().update_user(id, update).await?;

    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// Erase the personal data of a user (self or admin)
pub async fn anonymize_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<()>> {
    require_self_or_admin(&current_user, id)?;

    state.services.users().anonymize_user(id).await?;
    Ok(ApiResponse::message("User anonymized"))
}

/// Hard delete (admin only)
pub async fn delete_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    require_admin(&current_user)?;

    state.services.users().delete_user(id).await?;
    Ok(NoContent)
}
