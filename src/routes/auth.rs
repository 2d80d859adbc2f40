//! Routes under /auth handling registration and login, plus /api/me.
use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    db::models::appuser::AppUser,
    middleware::auth::{bearer_middleware, AuthenticatedUser},
    services::auth::{self, errors::PasswordPolicyError},
    state::AppState,
    utils::{extract::JsonBody, httperror::HttpError},
};

/// Create the router for registration, login and the current user.
pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/me", get(me))
        .route_layer(from_fn_with_state(state.clone(), bearer_middleware))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[derive(Deserialize)]
/// A request to /auth/register.
struct RegisterRequest {
    email: String,
    phone: Option<String>,
    password: String,
}

#[derive(Deserialize)]
/// A request to /auth/login.
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
/// A signed access token and the user it identifies.
pub struct AuthResponse {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub user: AppUser,
}

/// Issue a token for `user`, failing with a 500 if signing breaks.
pub fn issue_token(state: &AppState, user: AppUser) -> Result<AuthResponse, HttpError> {
    let issued = state.jwt.issue(&user).map_err(|err| {
        tracing::error!(error = %err, user_id = %user.id(), "failed to sign access token");
        HttpError::from(StatusCode::INTERNAL_SERVER_ERROR)
    })?;
    Ok(AuthResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user,
    })
}

async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), HttpError> {
    let user = auth::register(&body.email, body.phone, &body.password, &state.db).await?;
    tracing::info!(user_id = %user.id(), "user registered");
    Ok((StatusCode::CREATED, Json(issue_token(&state, user)?)))
}

async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, HttpError> {
    let user = auth::login(&body.email, &body.password, &state.db).await?;
    Ok(Json(issue_token(&state, user)?))
}

async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<AppUser>, HttpError> {
    auth::current_user(user.user_id, &state.db)
        .await?
        .map(Json)
        .ok_or_else(|| {
            tracing::warn!(user_id = %user.user_id, "valid token for a user that no longer exists");
            HttpError::with_message(StatusCode::UNAUTHORIZED, "User no longer exists")
        })
}

impl From<PasswordPolicyError> for HttpError {
    fn from(error: PasswordPolicyError) -> Self {
        Self::with_message(StatusCode::BAD_REQUEST, error.to_string())
    }
}

impl From<auth::errors::RegistrationError> for HttpError {
    fn from(error: auth::errors::RegistrationError) -> Self {
        match error {
            auth::errors::RegistrationError::DatabaseError(err) => err.into(),
            auth::errors::RegistrationError::InvalidEmail(err) => {
                Self::with_message(StatusCode::BAD_REQUEST, err.to_string())
            }
            auth::errors::RegistrationError::PasswordPolicy(err) => err.into(),
            auth::errors::RegistrationError::EmailTaken(email) => {
                tracing::info!(%email, "registration attempted with a taken email");
                Self::with_message(StatusCode::CONFLICT, "Email already registered")
            }
            auth::errors::RegistrationError::Hashing(err) => {
                tracing::error!(error = %err, "password hashing task failed during registration");
                StatusCode::INTERNAL_SERVER_ERROR.into()
            }
        }
    }
}

impl From<auth::errors::LoginError> for HttpError {
    fn from(error: auth::errors::LoginError) -> Self {
        match error {
            auth::errors::LoginError::DatabaseError(err) => err.into(),
            auth::errors::LoginError::InvalidCredentials => {
                tracing::info!("failed login attempt");
                Self::with_message(StatusCode::UNAUTHORIZED, "Invalid email or password")
            }
            auth::errors::LoginError::Hashing(err) => {
                tracing::error!(error = %err, "password verification task failed during login");
                StatusCode::INTERNAL_SERVER_ERROR.into()
            }
        }
    }
}
