//! The error type returned by every handler, rendered as `{"error": "..."}`.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::errors::DatabaseError;

/// A failed request: the status to answer with and, optionally, a message
/// safe to show the client.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    /// Falls back to the status's canonical reason when absent.
    message: Option<String>,
}

impl From<StatusCode> for HttpError {
    fn from(status: StatusCode) -> Self {
        Self {
            status,
            message: None,
        }
    }
}

impl HttpError {
    const fn new(status: StatusCode, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// An error with a client-facing message.
    pub fn with_message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, Some(message.into()))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let message = match self.message {
            Some(message) => message,
            None => self
                .status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_owned(),
        };
        (self.status, Json(json!({ "error": message }))).into_response()
    }
}

/// Storage failures are logged in full but reported to the client as a bare
/// 500 so that SQL never leaks.
impl From<DatabaseError> for HttpError {
    fn from(err: DatabaseError) -> Self {
        tracing::error!(error = %err, "database error raised in handler");
        Self::with_message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_defaults_to_canonical_reason() {
        let response = HttpError::from(StatusCode::NOT_FOUND).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn custom_message_keeps_status() {
        let err = HttpError::with_message(StatusCode::CONFLICT, "taken");
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message.as_deref(), Some("taken"));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
