//! Routes for menu sections and items, and the public table menu.
use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::models::{menu_item::MenuItem, menu_section::MenuSection},
    middleware::auth::{bearer_middleware, AuthenticatedUser},
    services::menu::{self, ItemUpdate, NewMenuItem, PublicMenu, SectionUpdate, SectionWithItems},
    state::AppState,
    utils::{
        extract::{JsonBody, PathParams},
        httperror::HttpError,
    },
};

/// Create the router for menu management and the public menu.
pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/restaurants/{restaurant_id}/menu", get(admin_menu))
        .route(
            "/api/restaurants/{restaurant_id}/menu/sections",
            get(list_sections).post(create_section),
        )
        .route(
            "/api/restaurants/{restaurant_id}/menu/sections/reorder",
            post(reorder_sections),
        )
        .route(
            "/api/restaurants/{restaurant_id}/menu/sections/{section_id}",
            put(update_section).delete(delete_section),
        )
        .route(
            "/api/restaurants/{restaurant_id}/menu/sections/{section_id}/move",
            post(move_section),
        )
        .route("/api/sections/{section_id}/items", post(create_item))
        .route("/api/items/reorder", post(reorder_items))
        .route("/api/items/{item_id}", put(update_item).delete(delete_item))
        .route("/api/items/{item_id}/availability", put(set_availability))
        .route("/api/items/{item_id}/move", post(move_item))
        .route_layer(from_fn_with_state(state.clone(), bearer_middleware))
        .route("/menu/{restaurant_id}/{table_code}", get(public_menu))
}

#[derive(Deserialize)]
struct CreateSectionRequest {
    name: String,
    display_order: Option<i64>,
}

#[derive(Deserialize)]
struct UpdateSectionRequest {
    name: Option<String>,
    display_order: Option<i64>,
}

#[derive(Deserialize)]
struct SectionOrder {
    section_id: Uuid,
    display_order: i64,
}

#[derive(Deserialize)]
struct ReorderSectionsRequest {
    section_orders: Vec<SectionOrder>,
}

#[derive(Deserialize)]
struct ItemOrder {
    item_id: Uuid,
    display_order: i64,
}

#[derive(Deserialize)]
struct ReorderItemsRequest {
    item_orders: Vec<ItemOrder>,
}

#[derive(Serialize)]
struct ReorderItemsResponse {
    updated_count: usize,
}

#[derive(Deserialize)]
/// Drag-and-drop target: the zero-based index to move to.
struct MoveRequest {
    position: usize,
}

#[derive(Deserialize)]
struct CreateItemRequest {
    name: String,
    description: Option<String>,
    /// Minor currency units.
    price: i64,
    display_order: Option<i64>,
}

#[derive(Deserialize)]
struct UpdateItemRequest {
    name: Option<String>,
    description: Option<String>,
    price: Option<i64>,
    display_order: Option<i64>,
}

#[derive(Deserialize)]
struct AvailabilityRequest {
    available: bool,
}

async fn admin_menu(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
) -> Result<Json<Vec<SectionWithItems>>, HttpError> {
    Ok(Json(
        menu::admin_menu(restaurant_id, user.user_id, &state.db).await?,
    ))
}

async fn create_section(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
    JsonBody(body): JsonBody<CreateSectionRequest>,
) -> Result<(StatusCode, Json<MenuSection>), HttpError> {
    let section = menu::create_section(
        restaurant_id,
        user.user_id,
        &body.name,
        body.display_order,
        &state.db,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(section)))
}

async fn list_sections(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
) -> Result<Json<Vec<MenuSection>>, HttpError> {
    Ok(Json(
        menu::list_sections(restaurant_id, user.user_id, &state.db).await?,
    ))
}

async fn update_section(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams((restaurant_id, section_id)): PathParams<(Uuid, Uuid)>,
    JsonBody(body): JsonBody<UpdateSectionRequest>,
) -> Result<Json<MenuSection>, HttpError> {
    let update = SectionUpdate {
        name: body.name,
        display_order: body.display_order,
    };
    Ok(Json(
        menu::update_section(restaurant_id, section_id, user.user_id, update, &state.db).await?,
    ))
}

async fn delete_section(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams((restaurant_id, section_id)): PathParams<(Uuid, Uuid)>,
) -> Result<StatusCode, HttpError> {
    menu::delete_section(restaurant_id, section_id, user.user_id, &state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reorder_sections(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
    JsonBody(body): JsonBody<ReorderSectionsRequest>,
) -> Result<Json<Vec<MenuSection>>, HttpError> {
    let orders = body
        .section_orders
        .into_iter()
        .map(|entry| (entry.section_id, entry.display_order))
        .collect();
    menu::reorder_sections(restaurant_id, user.user_id, orders, &state.db).await?;
    Ok(Json(
        menu::list_sections(restaurant_id, user.user_id, &state.db).await?,
    ))
}

async fn move_section(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams((restaurant_id, section_id)): PathParams<(Uuid, Uuid)>,
    JsonBody(body): JsonBody<MoveRequest>,
) -> Result<Json<Vec<MenuSection>>, HttpError> {
    Ok(Json(
        menu::move_section(
            restaurant_id,
            section_id,
            user.user_id,
            body.position,
            &state.db,
        )
        .await?,
    ))
}

async fn create_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(section_id): PathParams<Uuid>,
    JsonBody(body): JsonBody<CreateItemRequest>,
) -> Result<(StatusCode, Json<MenuItem>), HttpError> {
    let new_item = NewMenuItem {
        name: body.name,
        description: body.description,
        price: body.price,
        display_order: body.display_order,
    };
    let item = menu::create_item(section_id, user.user_id, new_item, &state.db).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(item_id): PathParams<Uuid>,
    JsonBody(body): JsonBody<UpdateItemRequest>,
) -> Result<Json<MenuItem>, HttpError> {
    let update = ItemUpdate {
        name: body.name,
        description: body.description,
        price: body.price,
        display_order: body.display_order,
    };
    Ok(Json(
        menu::update_item(item_id, user.user_id, update, &state.db).await?,
    ))
}

async fn delete_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(item_id): PathParams<Uuid>,
) -> Result<StatusCode, HttpError> {
    menu::delete_item(item_id, user.user_id, &state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_availability(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(item_id): PathParams<Uuid>,
    JsonBody(body): JsonBody<AvailabilityRequest>,
) -> Result<Json<MenuItem>, HttpError> {
    Ok(Json(
        menu::set_item_availability(item_id, user.user_id, body.available, &state.db).await?,
    ))
}

async fn reorder_items(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    JsonBody(body): JsonBody<ReorderItemsRequest>,
) -> Result<Json<ReorderItemsResponse>, HttpError> {
    let orders = body
        .item_orders
        .into_iter()
        .map(|entry| (entry.item_id, entry.display_order))
        .collect();
    let updated_count = menu::reorder_items(user.user_id, orders, &state.db).await?;
    Ok(Json(ReorderItemsResponse { updated_count }))
}

async fn move_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(item_id): PathParams<Uuid>,
    JsonBody(body): JsonBody<MoveRequest>,
) -> Result<Json<Vec<MenuItem>>, HttpError> {
    Ok(Json(
        menu::move_item(item_id, user.user_id, body.position, &state.db).await?,
    ))
}

async fn public_menu(
    State(state): State<AppState>,
    PathParams((restaurant_id, table_code)): PathParams<(Uuid, String)>,
) -> Result<Json<PublicMenu>, HttpError> {
    Ok(Json(
        menu::public_menu(restaurant_id, &table_code, &state.db).await?,
    ))
}

impl From<menu::errors::MenuError> for HttpError {
    fn from(error: menu::errors::MenuError) -> Self {
        match error {
            menu::errors::MenuError::DatabaseError(err) => err.into(),
            menu::errors::MenuError::Access(err) => err.into(),
            menu::errors::MenuError::Ordering(err) => {
                Self::with_message(StatusCode::BAD_REQUEST, err.to_string())
            }
            err @ (menu::errors::MenuError::SectionNonExistent(_)
            | menu::errors::MenuError::ItemNonExistent(_)) => {
                tracing::info!(reason = %err, "menu entity not found");
                Self::with_message(StatusCode::NOT_FOUND, err.to_string())
            }
            err @ (menu::errors::MenuError::InvalidName
            | menu::errors::MenuError::InvalidPrice(_)
            | menu::errors::MenuError::NoChanges
            | menu::errors::MenuError::EmptyReorder) => {
                Self::with_message(StatusCode::BAD_REQUEST, err.to_string())
            }
        }
    }
}

impl From<menu::errors::PublicMenuError> for HttpError {
    fn from(error: menu::errors::PublicMenuError) -> Self {
        match error {
            menu::errors::PublicMenuError::DatabaseError(err) => err.into(),
            menu::errors::PublicMenuError::TableNonExistent(code) => {
                tracing::info!(%code, "menu requested for unknown table code");
                Self::with_message(StatusCode::NOT_FOUND, "Table not found")
            }
            menu::errors::PublicMenuError::RestaurantNonExistent(restaurant_id) => {
                tracing::info!(%restaurant_id, "menu requested for unknown restaurant");
                Self::with_message(StatusCode::NOT_FOUND, "Restaurant not found")
            }
        }
    }
}
