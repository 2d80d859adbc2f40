//! Models mapping to the users database table. Represents a user who can
//! manage one or more restaurants.
use serde::Serialize;
use sqlx::{query, query_as, SqliteExecutor};
use time::OffsetDateTime;
use tokio::task::JoinError;
use uuid::Uuid;

use crate::{
    db::{self, errors::DatabaseError},
    utils::email::EmailAddress,
};

use super::password::HashedPassword;

/// INSERT model for an `AppUser`. Used ONLY when creating a new user.
pub struct AppUserInsert {
    /// The user's email address. Validated on construction.
    email: EmailAddress,
    /// The user's phone number.
    pub phone: Option<String>,
    /// The hashed password credential.
    password: HashedPassword,
}

/// An `AppUser` which is stored in the database. Can only be constructed by
/// reading it from the database.
#[derive(sqlx::FromRow, Serialize, Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct AppUser {
    /// The user's ID primary key.
    id: Uuid,
    /// The user's email address, lowercased.
    email: String,
    /// The user's phone number.
    pub phone: Option<String>,
    /// The Argon2id hash of the user's password. Never serialised.
    #[serde(skip)]
    password_hash: String,
    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl AppUserInsert {
    /// Construct a new `AppUser` INSERT model from an already hashed password.
    pub fn new(email: EmailAddress, phone: Option<String>, password: HashedPassword) -> Self {
        Self {
            email,
            phone,
            password,
        }
    }

    /// Store this INSERT model in the database and return a complete `AppUser` model.
    pub async fn store<'e, E>(self, executor: E) -> Result<AppUser, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, AppUser>(
            "INSERT INTO users (id, email, phone, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(self.email.as_str())
        .bind(self.phone)
        .bind(self.password.as_str())
        .bind(db::now())
        .fetch_one(executor)
        .await?)
    }
}

impl AppUser {
    /// Get the `AppUser`'s ID primary key.
    pub const fn id(&self) -> Uuid {
        self.id
    }
    /// Get the user's email address.
    pub fn email(&self) -> &str {
        &self.email
    }
    /// Verify a plaintext password against the stored credential.
    pub async fn verify_password(&self, password: &str) -> Result<bool, JoinError> {
        HashedPassword::from_stored(self.password_hash.clone())
            .verify_blocking(password)
            .await
    }
    /// Select an `AppUser` from the database by ID.
    pub async fn select_one<'e, E>(id: Uuid, executor: E) -> Result<Option<Self>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Self>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }
    /// Select an `AppUser` from the database by email.
    pub async fn select_by_email<'e, E>(
        email: &EmailAddress,
        executor: E,
    ) -> Result<Option<Self>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Self>("SELECT * FROM users WHERE email = ?")
            .bind(email.as_str())
            .fetch_optional(executor)
            .await?)
    }
    /// Count the users in the database.
    pub async fn count<'e, E>(executor: E) -> Result<i64, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(executor)
            .await?)
    }
    /// Update the database record to match the model's current state.
    pub async fn update<'e, E>(&self, executor: E) -> Result<(), DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        query("UPDATE users SET phone = ? WHERE id = ?")
            .bind(&self.phone)
            .bind(self.id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
