//! Routes for managing a restaurant's tables and their codes.
use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    middleware::auth::{bearer_middleware, AuthenticatedUser},
    services::tables::{self, RefreshedCode, TableQrUrl, TableWithUrl},
    state::AppState,
    utils::{
        extract::{JsonBody, PathParams},
        httperror::HttpError,
    },
};

pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/restaurants/{restaurant_id}/tables",
            get(list_tables).post(create_table),
        )
        .route(
            "/api/restaurants/{restaurant_id}/tables/{table_id}",
            put(update_table).delete(delete_table),
        )
        .route(
            "/api/restaurants/{restaurant_id}/tables/{table_id}/refresh-code",
            post(refresh_code),
        )
        .route(
            "/api/restaurants/{restaurant_id}/tables/{table_id}/qr-url",
            get(qr_url),
        )
        .route_layer(from_fn_with_state(state.clone(), bearer_middleware))
}

#[derive(Deserialize)]
struct CreateTableRequest {
    name: String,
}

#[derive(Deserialize)]
struct UpdateTableRequest {
    name: Option<String>,
}

async fn create_table(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
    JsonBody(body): JsonBody<CreateTableRequest>,
) -> Result<(StatusCode, Json<TableWithUrl>), HttpError> {
    let table = tables::create_table(
        restaurant_id,
        user.user_id,
        &body.name,
        &state.menu_base_url,
        &state.db,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(table)))
}

async fn list_tables(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
) -> Result<Json<Vec<TableWithUrl>>, HttpError> {
    Ok(Json(
        tables::list_tables(restaurant_id, user.user_id, &state.menu_base_url, &state.db).await?,
    ))
}

async fn update_table(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams((restaurant_id, table_id)): PathParams<(Uuid, Uuid)>,
    JsonBody(body): JsonBody<UpdateTableRequest>,
) -> Result<Json<TableWithUrl>, HttpError> {
    Ok(Json(
        tables::update_table(
            restaurant_id,
            table_id,
            user.user_id,
            body.name,
            &state.menu_base_url,
            &state.db,
        )
        .await?,
    ))
}

async fn delete_table(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams((restaurant_id, table_id)): PathParams<(Uuid, Uuid)>,
) -> Result<StatusCode, HttpError> {
    tables::delete_table(restaurant_id, table_id, user.user_id, &state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn refresh_code(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams((restaurant_id, table_id)): PathParams<(Uuid, Uuid)>,
) -> Result<Json<RefreshedCode>, HttpError> {
    Ok(Json(
        tables::refresh_code(
            restaurant_id,
            table_id,
            user.user_id,
            &state.menu_base_url,
            &state.db,
        )
        .await?,
    ))
}

async fn qr_url(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams((restaurant_id, table_id)): PathParams<(Uuid, Uuid)>,
) -> Result<Json<TableQrUrl>, HttpError> {
    Ok(Json(
        tables::get_qr_url(
            restaurant_id,
            table_id,
            user.user_id,
            &state.menu_base_url,
            &state.db,
        )
        .await?,
    ))
}

impl From<tables::errors::TableError> for HttpError {
    fn from(error: tables::errors::TableError) -> Self {
        match error {
            tables::errors::TableError::DatabaseError(err) => err.into(),
            tables::errors::TableError::Access(err) => err.into(),
            tables::errors::TableError::CodesExhausted => {
                tracing::error!("every drawn table code collided with an existing one");
                Self::with_message(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate a unique table code",
                )
            }
            tables::errors::TableError::TableNonExistent(table_id) => {
                tracing::info!(%table_id, "table not found");
                Self::with_message(StatusCode::NOT_FOUND, "Table not found")
            }
            err @ (tables::errors::TableError::InvalidName
            | tables::errors::TableError::NoChanges) => {
                Self::with_message(StatusCode::BAD_REQUEST, err.to_string())
            }
        }
    }
}
