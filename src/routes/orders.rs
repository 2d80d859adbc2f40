//! Routes for placing orders from a table and for the staff order dashboard.
use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    db::{self, models::apporder::AppOrderStatus},
    middleware::auth::{bearer_middleware, AuthenticatedUser},
    services::orders::{self, NewOrder, OrderLine, OrderView},
    state::AppState,
    utils::{
        extract::{JsonBody, PathParams},
        httperror::HttpError,
    },
};

/// Create the router for customer ordering and order management.
pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/restaurants/{restaurant_id}/orders", get(list_orders))
        .route(
            "/api/restaurants/{restaurant_id}/orders/today",
            get(list_todays_orders),
        )
        .route(
            "/api/restaurants/{restaurant_id}/orders/{order_id}/status",
            put(update_order_status),
        )
        .route(
            "/api/restaurants/{restaurant_id}/tables/{table_id}/orders",
            get(list_table_orders),
        )
        .route_layer(from_fn_with_state(state.clone(), bearer_middleware))
        .route("/orders", post(create_order))
        .route("/orders/{order_id}", get(get_order))
}

#[derive(Deserialize)]
/// A line of a customer's cart.
struct OrderLineRequest {
    menu_item_id: Uuid,
    quantity: i64,
    special_requests: Option<String>,
}

#[derive(Deserialize)]
/// A request to POST /orders.
struct CreateOrderRequest {
    table_code: String,
    customer_name: Option<String>,
    items: Vec<OrderLineRequest>,
}

#[derive(Serialize)]
struct CreateOrderResponse {
    order_id: Uuid,
    total_amount: i64,
    status: AppOrderStatus,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

#[derive(Deserialize)]
struct UpdateStatusRequest {
    status: AppOrderStatus,
}

async fn create_order(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), HttpError> {
    let new_order = NewOrder {
        table_code: body.table_code,
        customer_name: body.customer_name,
        items: body
            .items
            .into_iter()
            .map(|line| OrderLine {
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
                special_requests: line.special_requests,
            })
            .collect(),
    };
    let order = orders::create_order(new_order, &state.db).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order_id: order.id(),
            total_amount: order.total_amount(),
            status: order.status(),
            created_at: order.created_at(),
        }),
    ))
}

async fn get_order(
    State(state): State<AppState>,
    PathParams(order_id): PathParams<Uuid>,
) -> Result<Json<OrderView>, HttpError> {
    orders::get_order(order_id, &state.db)
        .await?
        .map(Json)
        .ok_or_else(|| HttpError::with_message(StatusCode::NOT_FOUND, "Order not found"))
}

async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
) -> Result<Json<Vec<OrderView>>, HttpError> {
    Ok(Json(
        orders::list_orders(restaurant_id, user.user_id, &state.db).await?,
    ))
}

async fn list_todays_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
) -> Result<Json<Vec<OrderView>>, HttpError> {
    Ok(Json(
        orders::list_todays_orders(restaurant_id, user.user_id, db::now(), &state.db).await?,
    ))
}

async fn list_table_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams((restaurant_id, table_id)): PathParams<(Uuid, Uuid)>,
) -> Result<Json<Vec<OrderView>>, HttpError> {
    Ok(Json(
        orders::list_table_orders(restaurant_id, table_id, user.user_id, &state.db).await?,
    ))
}

async fn update_order_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams((restaurant_id, order_id)): PathParams<(Uuid, Uuid)>,
    JsonBody(body): JsonBody<UpdateStatusRequest>,
) -> Result<Json<OrderView>, HttpError> {
    Ok(Json(
        orders::update_order_status(
            restaurant_id,
            order_id,
            user.user_id,
            body.status,
            &state.db,
        )
        .await?,
    ))
}

impl From<orders::errors::OrderCreationError> for HttpError {
    fn from(error: orders::errors::OrderCreationError) -> Self {
        match error {
            orders::errors::OrderCreationError::DatabaseError(err) => err.into(),
            orders::errors::OrderCreationError::TableNonExistent(code) => {
                tracing::info!(%code, "order placed for unknown table code");
                Self::with_message(StatusCode::NOT_FOUND, "Table not found")
            }
            err @ (orders::errors::OrderCreationError::NoItems
            | orders::errors::OrderCreationError::TooManyItems
            | orders::errors::OrderCreationError::InvalidQuantity(_)
            | orders::errors::OrderCreationError::ItemNonExistent(_)
            | orders::errors::OrderCreationError::ItemUnavailable(_)
            | orders::errors::OrderCreationError::CostTooLarge) => {
                tracing::info!(reason = %err, "rejected order");
                Self::with_message(StatusCode::BAD_REQUEST, err.to_string())
            }
        }
    }
}

impl From<orders::errors::OrderQueryError> for HttpError {
    fn from(error: orders::errors::OrderQueryError) -> Self {
        match error {
            orders::errors::OrderQueryError::DatabaseError(err) => err.into(),
            orders::errors::OrderQueryError::Access(err) => err.into(),
            err @ orders::errors::OrderQueryError::TableNonExistent(_) => {
                Self::with_message(StatusCode::NOT_FOUND, err.to_string())
            }
        }
    }
}

impl From<orders::errors::OrderStatusError> for HttpError {
    fn from(error: orders::errors::OrderStatusError) -> Self {
        match error {
            orders::errors::OrderStatusError::DatabaseError(err) => err.into(),
            orders::errors::OrderStatusError::Access(err) => err.into(),
            err @ orders::errors::OrderStatusError::OrderNonExistent(_) => {
                Self::with_message(StatusCode::NOT_FOUND, err.to_string())
            }
            err @ orders::errors::OrderStatusError::InvalidTransition { .. } => {
                Self::with_message(StatusCode::CONFLICT, err.to_string())
            }
        }
    }
}
