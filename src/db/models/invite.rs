//! Models mapping to the manager_invites table. Only a SHA-256 hash of each
//! invite token is stored.
use sqlx::{query, query_as, SqliteExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{self, errors::DatabaseError};

/// INSERT model for a `ManagerInvite`.
pub struct ManagerInviteInsert {
    pub restaurant_id: Uuid,
    pub email: String,
    pub can_manage_menu: bool,
    pub token_hash: String,
    pub expires_at: OffsetDateTime,
}

/// A stored, possibly expired, manager invite.
#[derive(sqlx::FromRow, Debug)]
pub struct ManagerInvite {
    id: Uuid,
    restaurant_id: Uuid,
    pub email: String,
    pub can_manage_menu: bool,
    pub expires_at: OffsetDateTime,
}

impl ManagerInviteInsert {
    /// Store this INSERT model in the database.
    pub async fn store<'e, E>(self, executor: E) -> Result<ManagerInvite, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, ManagerInvite>(
            "INSERT INTO manager_invites
            (id, restaurant_id, email, can_manage_menu, token_hash, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(self.restaurant_id)
        .bind(self.email)
        .bind(self.can_manage_menu)
        .bind(self.token_hash)
        .bind(self.expires_at)
        .bind(db::now())
        .fetch_one(executor)
        .await?)
    }
}

impl ManagerInvite {
    pub const fn restaurant_id(&self) -> Uuid {
        self.restaurant_id
    }
    /// Whether the invite can no longer be redeemed at `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
    /// Select an invite for a restaurant by its token hash.
    pub async fn select_by_token_hash<'e, E>(
        restaurant_id: Uuid,
        token_hash: &str,
        executor: E,
    ) -> Result<Option<Self>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Self>(
            "SELECT * FROM manager_invites WHERE restaurant_id = ? AND token_hash = ?",
        )
        .bind(restaurant_id)
        .bind(token_hash)
        .fetch_optional(executor)
        .await?)
    }
    /// Whether an unexpired invite for this email exists at the restaurant.
    pub async fn active_exists<'e, E>(
        restaurant_id: Uuid,
        email: &str,
        now: OffsetDateTime,
        executor: E,
    ) -> Result<bool, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM manager_invites
            WHERE restaurant_id = ? AND email = ? AND expires_at > ?",
        )
        .bind(restaurant_id)
        .bind(email)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(count > 0)
    }
    /// Remove expired invites for an email so a fresh one can be issued.
    pub async fn delete_expired<'e, E>(
        restaurant_id: Uuid,
        email: &str,
        now: OffsetDateTime,
        executor: E,
    ) -> Result<(), DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        query(
            "DELETE FROM manager_invites
            WHERE restaurant_id = ? AND email = ? AND expires_at <= ?",
        )
        .bind(restaurant_id)
        .bind(email)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(())
    }
    /// Delete the corresponding record, consuming the invite. Returns `false`
    /// if another redemption already removed it.
    pub async fn delete<'e, E>(self, executor: E) -> Result<bool, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        let result = query("DELETE FROM manager_invites WHERE id = ?")
            .bind(self.id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
