//! Routes for inviting, listing and administering restaurant managers, plus
//! the public invite redemption endpoint.
use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::models::manager::ManagerInfo,
    middleware::auth::{bearer_middleware, AuthenticatedUser},
    routes::auth::{issue_token, AuthResponse},
    services::managers::{self, InviteCreated, JoinDetails},
    state::AppState,
    utils::{
        extract::{JsonBody, PathParams},
        httperror::HttpError,
    },
};

/// Create the router for manager administration and invite redemption.
pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/restaurants/{restaurant_id}/managers",
            get(list_managers),
        )
        .route(
            "/api/restaurants/{restaurant_id}/managers/invite",
            post(invite_manager),
        )
        .route(
            "/api/restaurants/{restaurant_id}/managers/{user_id}",
            delete(remove_manager).put(update_manager_permissions),
        )
        .route_layer(from_fn_with_state(state.clone(), bearer_middleware))
        .route(
            "/restaurants/{restaurant_id}/managers/join/{token}",
            post(join_restaurant),
        )
}

#[derive(Deserialize)]
struct InviteRequest {
    email: String,
    #[serde(default)]
    can_manage_menu: bool,
}

#[derive(Deserialize)]
struct JoinRequest {
    email: String,
    password: String,
    phone: Option<String>,
}

#[derive(Deserialize)]
struct UpdatePermissionsRequest {
    can_manage_menu: bool,
}

async fn invite_manager(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
    JsonBody(body): JsonBody<InviteRequest>,
) -> Result<(StatusCode, Json<InviteCreated>), HttpError> {
    let invite = managers::invite_manager(
        restaurant_id,
        user.user_id,
        &body.email,
        body.can_manage_menu,
        &state.db,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(invite)))
}

async fn join_restaurant(
    State(state): State<AppState>,
    PathParams((restaurant_id, token)): PathParams<(Uuid, String)>,
    JsonBody(body): JsonBody<JoinRequest>,
) -> Result<Json<AuthResponse>, HttpError> {
    let details = JoinDetails {
        email: body.email,
        password: body.password,
        phone: body.phone,
    };
    let user = managers::join_restaurant(restaurant_id, &token, details, &state.db).await?;
    Ok(Json(issue_token(&state, user)?))
}

async fn list_managers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams(restaurant_id): PathParams<Uuid>,
) -> Result<Json<Vec<ManagerInfo>>, HttpError> {
    Ok(Json(
        managers::list_managers(restaurant_id, user.user_id, &state.db).await?,
    ))
}

async fn remove_manager(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams((restaurant_id, target_user_id)): PathParams<(Uuid, Uuid)>,
) -> Result<StatusCode, HttpError> {
    managers::remove_manager(restaurant_id, user.user_id, target_user_id, &state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_manager_permissions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    PathParams((restaurant_id, target_user_id)): PathParams<(Uuid, Uuid)>,
    JsonBody(body): JsonBody<UpdatePermissionsRequest>,
) -> Result<StatusCode, HttpError> {
    managers::update_manager_permissions(
        restaurant_id,
        user.user_id,
        target_user_id,
        body.can_manage_menu,
        &state.db,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

impl From<managers::errors::InviteError> for HttpError {
    fn from(error: managers::errors::InviteError) -> Self {
        match error {
            managers::errors::InviteError::DatabaseError(err) => err.into(),
            managers::errors::InviteError::Access(err) => err.into(),
            managers::errors::InviteError::InvalidEmail(err) => {
                Self::with_message(StatusCode::BAD_REQUEST, err.to_string())
            }
            managers::errors::InviteError::Random(err) => {
                tracing::error!(error = %err, "OS random source failed while creating invite");
                StatusCode::INTERNAL_SERVER_ERROR.into()
            }
            err @ (managers::errors::InviteError::AlreadyManager(_)
            | managers::errors::InviteError::InviteOutstanding(_)) => {
                Self::with_message(StatusCode::CONFLICT, err.to_string())
            }
        }
    }
}

impl From<managers::errors::JoinError> for HttpError {
    fn from(error: managers::errors::JoinError) -> Self {
        match error {
            managers::errors::JoinError::DatabaseError(err) => err.into(),
            managers::errors::JoinError::InvalidEmail(err) => {
                Self::with_message(StatusCode::BAD_REQUEST, err.to_string())
            }
            managers::errors::JoinError::PasswordPolicy(err) => err.into(),
            err @ (managers::errors::JoinError::InvalidInvite
            | managers::errors::JoinError::EmailMismatch) => {
                tracing::info!(reason = %err, "rejected invite redemption");
                Self::with_message(StatusCode::BAD_REQUEST, err.to_string())
            }
            managers::errors::JoinError::InvalidCredentials => {
                Self::with_message(StatusCode::UNAUTHORIZED, "Invalid email or password")
            }
            err @ managers::errors::JoinError::AlreadyManager => {
                Self::with_message(StatusCode::CONFLICT, err.to_string())
            }
            managers::errors::JoinError::Hashing(err) => {
                tracing::error!(error = %err, "password hashing task failed while joining");
                StatusCode::INTERNAL_SERVER_ERROR.into()
            }
        }
    }
}

impl From<managers::errors::ManagerError> for HttpError {
    fn from(error: managers::errors::ManagerError) -> Self {
        match error {
            managers::errors::ManagerError::DatabaseError(err) => err.into(),
            managers::errors::ManagerError::Access(err) => err.into(),
            err @ (managers::errors::ManagerError::CannotRemoveSelf
            | managers::errors::ManagerError::SuperAdminImmutable) => {
                Self::with_message(StatusCode::BAD_REQUEST, err.to_string())
            }
            managers::errors::ManagerError::NotManager(user_id) => {
                tracing::info!(%user_id, "manager not found");
                Self::with_message(StatusCode::NOT_FOUND, "Manager not found")
            }
        }
    }
}
