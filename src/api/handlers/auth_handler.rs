//! Authentication handlers.

use axum::{
    extract::{Extension, Path, State},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{authenticated, require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{ProfileResponse, Role};
use crate::errors::AppResult;
use crate::services::{Registration, TokenResponse};
use crate::types::{ApiResponse, Created};

/// User registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Firstname is required"))]
    pub firstname: String,
    #[validate(length(min = 1, max = 100, message = "Lastname is required"))]
    pub lastname: String,
    #[validate(length(min = 6, max = 20, message = "Invalid phone number"))]
    pub phone: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

/// Create authentication routes
pub fn auth_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    let protected = Router::new()
        .route("/me", get(me))
        .route("/me/password", put(change_password))
        .route("/:user_id/role", put(change_role));

    public.merge(authenticated(state, protected))
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<ProfileResponse>> {
    let profile = state
        .services
        .auth()
        .register(Registration {
            email: payload.email,
            password: payload.password,
            firstname: payload.firstname,
            lastname: payload.lastname,
            phone: payload.phone,
        })
        .await?;

    Ok(Created(profile))
}

/// Login and get JWT token
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let token = state
        .services
        .auth()
        .login(payload.email, payload.password)
        .await?;

    Ok(ApiResponse::success(token))
}

/// Profile of the authenticated user
pub async fn me(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state.services.auth().profile(current_user.id).await?;
    Ok(ApiResponse::success(profile))
}

pub async fn change_password(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .services
        .auth()
        .change_password(
            current_user.id,
            payload.current_password,
            payload.new_password,
        )
        .await?;

    Ok(ApiResponse::message("Password updated"))
}

/// Change the role of an account (admin only)
pub async fn change_role(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ChangeRoleRequest>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    require_admin(&current_user)?;

    let profile = state
        .services
        .auth()
        .change_role(user_id, payload.role)
        .await?;

    Ok(ApiResponse::success(profile))
}
