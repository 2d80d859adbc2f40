//! Defines the state shared across the Axum application.
use std::sync::Arc;

use crate::{db, services::auth::JwtKeys, settings::Settings};

#[derive(Clone)]
/// The state struct shared across routers.
pub struct AppState {
    /// A database connection pool for getting new database connections.
    pub db: db::ConnectionPool,
    /// Keys for signing and verifying bearer tokens.
    pub jwt: Arc<JwtKeys>,
    /// Public origin of the customer menu app, used in QR URLs.
    pub menu_base_url: Arc<str>,
}

impl AppState {
    pub fn new(db: db::ConnectionPool, settings: &Settings) -> Self {
        Self {
            db,
            jwt: Arc::new(JwtKeys::new(
                &settings.jwt_secret(),
                settings.jwt.expiration_hours,
            )),
            menu_base_url: Arc::from(settings.menu.base_url.as_str()),
        }
    }
}
