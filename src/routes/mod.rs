//! API routes within the application. Each module exposes a router with
//! absolute paths; `create_app` merges them and adds the outer layers.
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    db, services::access::errors::AccessError, settings::CorsSettings, state::AppState,
    utils::httperror::HttpError,
};

pub mod auth;
pub mod managers;
pub mod menu;
pub mod orders;
pub mod qr;
pub mod restaurants;
pub mod tables;

/// Build the complete application router.
pub fn create_app(state: AppState, cors: &CorsSettings) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth::create_router(&state))
        .merge(restaurants::create_router(&state))
        .merge(managers::create_router(&state))
        .merge(menu::create_router(&state))
        .merge(tables::create_router(&state))
        .merge(qr::create_router(&state))
        .merge(orders::create_router(&state))
        .layer(cors_layer(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": db::now().unix_timestamp(),
    }))
}

fn cors_layer(cors: &CorsSettings) -> CorsLayer {
    let allow_origin = if cors.allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(cors.allowed_origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| tracing::warn!(%origin, "ignoring invalid CORS origin"))
                .ok()
        }))
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}

impl From<AccessError> for HttpError {
    fn from(error: AccessError) -> Self {
        match error {
            AccessError::DatabaseError(err) => err.into(),
            AccessError::NotManager {
                restaurant_id,
                user_id,
            } => {
                tracing::warn!(%restaurant_id, %user_id, "access by a non-manager");
                Self::with_message(StatusCode::FORBIDDEN, "Access denied")
            }
            AccessError::Insufficient {
                restaurant_id,
                user_id,
                permission,
            } => {
                tracing::warn!(%restaurant_id, %user_id, ?permission, "insufficient permissions");
                Self::with_message(StatusCode::FORBIDDEN, "Insufficient permissions")
            }
        }
    }
}
