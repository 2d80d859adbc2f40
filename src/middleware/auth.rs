//! Middleware used for checking user authentication.
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt as _};
use uuid::Uuid;

use crate::{state::AppState, utils::httperror::HttpError};

#[derive(Clone, Debug)]
/// The user a request was authenticated as.
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Middleware to validate a bearer token and identify the associated user.
pub async fn bearer_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let Some(authorization) = req.headers().typed_get::<Authorization<Bearer>>() else {
        return Err(HttpError::with_message(
            StatusCode::UNAUTHORIZED,
            "Missing bearer token",
        ));
    };
    let claims = state.jwt.verify(authorization.token()).map_err(|err| {
        tracing::debug!(error = %err, "rejected bearer token");
        HttpError::with_message(StatusCode::UNAUTHORIZED, "Invalid or expired token")
    })?;
    req.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.sub,
        email: claims.email,
    });
    Ok(next.run(req).await)
}
