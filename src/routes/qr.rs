//! Routes rendering table QR codes and the printable sheet.
use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    middleware::auth::{bearer_middleware, AuthenticatedUser},
    services::qr::{self, PrintSheet, QrCodeImage},
    state::AppState,
    utils::{
        extract::{JsonBody, PathParams, QueryParams},
        httperror::HttpError,
    },
};

pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/restaurants/{restaurant_id}/qr-codes/generate",
            post(generate),
        )
        .route(
            "/api/restaurants/{restaurant_id}/qr-codes/bulk",
            post(generate_bulk),
        )
        .route(
            "/api/restaurants/{restaurant_id}/qr-codes/print-sheet",
            get(print_sheet),
        )
        .route_layer(from_fn_with_state(state.clone(), bearer_middleware))
}

#[derive(Deserialize)]
struct GenerateRequest {
    table_id: Uuid,
    format: Option<String>,
}

#[derive(Deserialize)]
struct BulkRequest {
    #[serde(default)]
    table_ids: Vec<Uuid>,
}

#[derive(Deserialize)]
struct PrintSheetQuery {
    /// Comma separated table IDs. All tables when absent.
    table_ids: Option<String>,
}

/// Parse a comma separated list of UUIDs, ignoring empty segments.
fn parse_table_ids(raw: Option<&str>) -> Result<Vec<Uuid>, HttpError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            Uuid::parse_str(part).map_err(|_| {
                HttpError::with_message(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid table ID '{part}'"),
                )
            })
        })
        .collect()
}

async fn generate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
    JsonBody(body): JsonBody<GenerateRequest>,
) -> Result<Json<QrCodeImage>, HttpError> {
    Ok(Json(
        qr::generate(
            restaurant_id,
            user.user_id,
            body.table_id,
            body.format.as_deref(),
            &state.menu_base_url,
            &state.db,
        )
        .await?,
    ))
}

async fn generate_bulk(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
    JsonBody(body): JsonBody<BulkRequest>,
) -> Result<Json<Vec<QrCodeImage>>, HttpError> {
    Ok(Json(
        qr::generate_bulk(
            restaurant_id,
            user.user_id,
            &body.table_ids,
            &state.menu_base_url,
            &state.db,
        )
        .await?,
    ))
}

async fn print_sheet(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
    QueryParams(query): QueryParams<PrintSheetQuery>,
) -> Result<Json<PrintSheet>, HttpError> {
    let table_ids = parse_table_ids(query.table_ids.as_deref())?;
    Ok(Json(
        qr::print_sheet(
            restaurant_id,
            user.user_id,
            &table_ids,
            &state.menu_base_url,
            &state.db,
        )
        .await?,
    ))
}

impl From<qr::errors::QrError> for HttpError {
    fn from(error: qr::errors::QrError) -> Self {
        match error {
            qr::errors::QrError::DatabaseError(err) => err.into(),
            qr::errors::QrError::Access(err) => err.into(),
            qr::errors::QrError::Encoding(err) => {
                tracing::error!(error = ?err, "failed to encode table URL as a QR code");
                Self::with_message(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate QR code",
                )
            }
            err @ qr::errors::QrError::UnsupportedFormat(_) => {
                Self::with_message(StatusCode::BAD_REQUEST, err.to_string())
            }
            err @ (qr::errors::QrError::TableNonExistent(_)
            | qr::errors::QrError::RestaurantNonExistent(_)) => {
                Self::with_message(StatusCode::NOT_FOUND, err.to_string())
            }
        }
    }
}
