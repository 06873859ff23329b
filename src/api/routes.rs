//! Application route configuration.

use axum::{
    extract::State,
    http::{HeaderName, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::handlers::{
    auth_routes, brand_routes, car_routes, city_routes, color_routes, driver_routes,
    inscription_routes, model_routes, travel_routes, user_routes,
};
use super::middleware::{authenticated, RequestUuid};
use super::AppState;
use crate::config::{API_PREFIX, REQUEST_ID_HEADER};

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let api = Router::new()
        .nest("/auth", auth_routes(&state))
        .nest("/users", authenticated(&state, user_routes()))
        .nest("/drivers", authenticated(&state, driver_routes()))
        .nest("/cars", authenticated(&state, car_routes()))
        .nest("/brands", brand_routes(&state))
        .nest("/models", model_routes(&state))
        .nest("/colors", color_routes(&state))
        .nest("/cities", city_routes(&state))
        .nest("/travels", travel_routes(&state))
        .nest("/inscriptions", authenticated(&state, inscription_routes()));

    Router::new()
        .route("/health", get(health))
        .nest(API_PREFIX, api)
        // Outermost last: the id is set before the trace span opens
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, RequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub services: ServiceHealth,
}

/// Individual service health status
#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub database: ServiceStatus,
    pub cache: ServiceStatus,
}

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Database and cache connectivity.
///
/// Only a database outage fails the check; a missing cache degrades it.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match state.database.ping().await {
        Ok(()) => ServiceStatus {
            status: "healthy",
            backend: None,
            error: None,
        },
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            ServiceStatus {
                status: "unhealthy",
                backend: None,
                error: Some(e.to_string()),
            }
        }
    };

    let backend = state.cache.backend();
    let cache_status = if !state.cache.is_enabled() {
        "disabled"
    } else if backend.is_healthy().await {
        "healthy"
    } else {
        "unhealthy"
    };
    let cache = ServiceStatus {
        status: cache_status,
        backend: Some(backend.name()),
        error: None,
    };

    let database_up = database.status == "healthy";
    let status = match (database_up, cache.status) {
        (false, _) => "unhealthy",
        (true, "unhealthy") => "degraded",
        (true, _) => "healthy",
    };
    let code = if database_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(HealthResponse {
            status,
            services: ServiceHealth { database, cache },
        }),
    )
}
