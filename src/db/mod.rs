//! Contains database models and interaction code.
pub mod models;

use std::str::FromStr as _;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use time::OffsetDateTime;

use crate::settings::DatabaseSettings;

/// An alias for the underlying DBMS specific pool type.
pub type ConnectionPool = sqlx::SqlitePool;

/// Initiate a pooled connection to the database.
///
/// In-memory databases live only as long as their connection, so they are
/// pinned to a single connection that is never recycled.
pub async fn connect(settings: &DatabaseSettings) -> Result<ConnectionPool, errors::DatabaseError> {
    let options = SqliteConnectOptions::from_str(&settings.url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let in_memory = settings.url.contains(":memory:") || settings.url.contains("mode=memory");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(settings.max_connections.max(1))
    };
    Ok(pool_options.connect_with(options).await?)
}

/// Apply any outstanding migrations from `migrations/`.
pub async fn migrate(db_conn: &ConnectionPool) -> Result<(), errors::DatabaseError> {
    sqlx::migrate!("./migrations")
        .run(db_conn)
        .await
        .map_err(sqlx::Error::from)?;
    Ok(())
}

/// A migrated single-connection in-memory database for unit tests.
#[cfg(test)]
pub async fn memory_pool() -> ConnectionPool {
    let pool = connect(&DatabaseSettings {
        url: "sqlite::memory:".to_owned(),
        max_connections: 1,
        seed_demo_data: false,
    })
    .await
    .expect("in-memory database");
    migrate(&pool).await.expect("migrations apply");
    pool
}

/// The current UTC time at whole-second precision. Stored timestamps all come
/// from here so that their text form has a fixed width and sorts correctly.
pub fn now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

pub mod errors {
    use thiserror::Error;

    #[derive(Error, Debug)]
    #[error(transparent)]
    pub struct DatabaseError(#[from] sqlx::Error);

    impl DatabaseError {
        /// Whether the error is a UNIQUE constraint violation.
        pub fn is_unique_violation(&self) -> bool {
            match &self.0 {
                sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::now;

    #[test]
    fn now_has_no_subsecond_component() {
        assert_eq!(now().nanosecond(), 0);
    }
}
