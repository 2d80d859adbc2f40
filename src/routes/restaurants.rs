//! Routes for creating, viewing and administering restaurants.
use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::models::restaurant::{Restaurant, RestaurantInsert, RestaurantMembership},
    middleware::auth::{bearer_middleware, AuthenticatedUser},
    services::restaurants::{self, RestaurantDetails, RestaurantUpdate},
    state::AppState,
    utils::{
        extract::{JsonBody, PathParams},
        httperror::HttpError,
    },
};

/// Create the router for /api/restaurants.
pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/restaurants",
            get(list_restaurants).post(create_restaurant),
        )
        .route(
            "/api/restaurants/{restaurant_id}",
            get(get_restaurant)
                .put(update_restaurant)
                .delete(delete_restaurant),
        )
        .route_layer(from_fn_with_state(state.clone(), bearer_middleware))
}

#[derive(Deserialize)]
struct CreateRestaurantRequest {
    name: String,
    address: Option<String>,
    establishment_year: Option<i32>,
    google_maps_link: Option<String>,
}

#[derive(Deserialize)]
struct UpdateRestaurantRequest {
    name: Option<String>,
    address: Option<String>,
    establishment_year: Option<i32>,
    google_maps_link: Option<String>,
}

async fn create_restaurant(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    JsonBody(body): JsonBody<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<Restaurant>), HttpError> {
    let insert = RestaurantInsert {
        name: body.name,
        address: body.address,
        establishment_year: body.establishment_year,
        google_maps_link: body.google_maps_link,
    };
    let restaurant = restaurants::create_restaurant(user.user_id, insert, &state.db).await?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}

async fn list_restaurants(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<RestaurantMembership>>, HttpError> {
    Ok(Json(
        restaurants::list_restaurants(user.user_id, &state.db).await?,
    ))
}

async fn get_restaurant(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
) -> Result<Json<RestaurantDetails>, HttpError> {
    Ok(Json(
        restaurants::get_restaurant(restaurant_id, user.user_id, &state.db).await?,
    ))
}

async fn update_restaurant(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
    JsonBody(body): JsonBody<UpdateRestaurantRequest>,
) -> Result<Json<Restaurant>, HttpError> {
    let update = RestaurantUpdate {
        name: body.name,
        address: body.address,
        establishment_year: body.establishment_year,
        google_maps_link: body.google_maps_link,
    };
    Ok(Json(
        restaurants::update_restaurant(restaurant_id, user.user_id, update, &state.db).await?,
    ))
}

async fn delete_restaurant(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
) -> Result<StatusCode, HttpError> {
    restaurants::delete_restaurant(restaurant_id, user.user_id, &state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

impl From<restaurants::errors::RestaurantError> for HttpError {
    fn from(error: restaurants::errors::RestaurantError) -> Self {
        match error {
            restaurants::errors::RestaurantError::DatabaseError(err) => err.into(),
            restaurants::errors::RestaurantError::Access(err) => err.into(),
            restaurants::errors::RestaurantError::RestaurantNonExistent(restaurant_id) => {
                tracing::warn!(%restaurant_id, "restaurant vanished after access check");
                Self::with_message(StatusCode::NOT_FOUND, "Restaurant not found")
            }
            err @ (restaurants::errors::RestaurantError::InvalidName
            | restaurants::errors::RestaurantError::NoChanges) => {
                Self::with_message(StatusCode::BAD_REQUEST, err.to_string())
            }
        }
    }
}
