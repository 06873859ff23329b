//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::{self, Next},
    response::Response,
    Router,
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::Role;
use crate::errors::AppError;
use crate::services::Actor;

/// Authenticated user extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Caller identity handed to the services
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// JWT authentication middleware.
///
/// Extracts and validates the JWT token from the Authorization header,
/// then injects the CurrentUser into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = state.services.auth().verify_token(token)?;

    let current_user = CurrentUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    };

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Put every route of `routes` behind [`auth_middleware`].
///
/// Used for routers merged with public routes on the same paths.
pub fn authenticated(state: &AppState, routes: Router<AppState>) -> Router<AppState> {
    routes.route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    require_role(user, Role::Admin)
}

/// Require `required` or any role above it.
pub fn require_role(user: &CurrentUser, required: Role) -> Result<(), AppError> {
    if user.role.can_access(required) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Allow the user themself or an admin
pub fn require_self_or_admin(user: &CurrentUser, user_id: i32) -> Result<(), AppError> {
    if user.id == user_id {
        Ok(())
    } else {
        require_admin(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: 1,
            email: "a@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&user(Role::Driver), Role::Driver).is_ok());
        assert!(require_role(&user(Role::Admin), Role::Driver).is_ok());
        assert!(matches!(
            require_role(&user(Role::User), Role::Driver),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_require_self_or_admin() {
        assert!(require_self_or_admin(&user(Role::User), 1).is_ok());
        assert!(require_self_or_admin(&user(Role::Admin), 2).is_ok());
        assert!(require_self_or_admin(&user(Role::Driver), 2).is_err());
    }
}
