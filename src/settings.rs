//! Layered runtime configuration.
//!
//! Settings are read, in increasing priority, from built-in defaults, an
//! optional `settings.*` file, an optional `local.settings.*` file and
//! `LETSORDER__`-prefixed environment variables (`LETSORDER__SERVER__PORT`
//! maps to `server.port`).
use std::net::SocketAddr;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::{
    secrets::{read_secret, JWT_SECRET_DOCKER_SECRET},
    tokens::DEVELOPMENT_JWT_SECRET,
};

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "LETSORDER";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// An sqlx SQLite URL, e.g. `sqlite:./letsorder.db` or `sqlite::memory:`.
    pub url: String,
    pub max_connections: u32,
    /// Insert demo data when the database has no users.
    pub seed_demo_data: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite:./letsorder.db".to_owned(),
            max_connections: 10,
            seed_demo_data: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtSettings {
    /// HMAC signing key. Falls back to a Docker secret when absent.
    pub secret: Option<String>,
    pub expiration_hours: u32,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: None,
            expiration_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_owned()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MenuSettings {
    /// Public origin of the customer menu app, used to build QR URLs.
    pub base_url: String,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4321".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

/// The complete application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub cors: CorsSettings,
    pub menu: MenuSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Load settings from files and the environment.
    ///
    /// # Errors
    /// Fails if a present file is malformed or a value has the wrong type.
    pub fn load() -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(File::with_name("local.settings").required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// The socket address the server binds to.
    ///
    /// # Errors
    /// Fails if `server.host` is not an IP address.
    pub fn bind_address(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }

    /// Resolve the JWT signing key: configured value, then Docker secret, then
    /// the development default.
    pub fn jwt_secret(&self) -> String {
        if let Some(secret) = self.jwt.secret.as_ref().filter(|s| !s.is_empty()) {
            return secret.clone();
        }
        if let Ok(secret_name) = std::env::var(JWT_SECRET_DOCKER_SECRET) {
            match read_secret(&secret_name) {
                Ok(secret) if !secret.is_empty() => return secret,
                Ok(_) => tracing::warn!(secret = %secret_name, "JWT docker secret is empty"),
                Err(err) => {
                    tracing::warn!(secret = %secret_name, error = %err, "failed to read JWT docker secret");
                }
            }
        }
        tracing::warn!("no JWT secret configured, using the development default");
        DEVELOPMENT_JWT_SECRET.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;

    #[test]
    fn defaults_are_usable() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.jwt.expiration_hours, 24);
        assert!(settings.bind_address().is_ok());
    }

    #[test]
    fn configured_jwt_secret_wins() {
        let mut settings = Settings::default();
        settings.jwt.secret = Some("configured".to_owned());
        assert_eq!(settings.jwt_secret(), "configured");
    }
}
