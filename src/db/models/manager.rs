//! Models mapping to the restaurant_managers table, which links users to the
//! restaurants they manage and records what they may do there.
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, SqliteExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{self, errors::DatabaseError};

/// A manager's role within a restaurant.
#[derive(sqlx::Type, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ManagerRole {
    /// Created the restaurant or was promoted; may administer it.
    SuperAdmin,
    /// Joined through an invite.
    Manager,
}

/// INSERT model for a `RestaurantManager`.
pub struct RestaurantManagerInsert {
    pub restaurant_id: Uuid,
    pub user_id: Uuid,
    pub role: ManagerRole,
    pub can_manage_menu: bool,
}

/// A stored manager link.
#[derive(sqlx::FromRow, Serialize, Clone, Debug)]
pub struct RestaurantManager {
    restaurant_id: Uuid,
    user_id: Uuid,
    pub role: ManagerRole,
    pub can_manage_menu: bool,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

/// A manager link joined with the user's contact details.
#[derive(sqlx::FromRow, Serialize, Debug)]
pub struct ManagerInfo {
    pub user_id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub role: ManagerRole,
    pub can_manage_menu: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
}

impl RestaurantManagerInsert {
    /// Store this INSERT model in the database.
    pub async fn store<'e, E>(self, executor: E) -> Result<RestaurantManager, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, RestaurantManager>(
            "INSERT INTO restaurant_managers
            (restaurant_id, user_id, role, can_manage_menu, created_at)
            VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(self.restaurant_id)
        .bind(self.user_id)
        .bind(self.role)
        .bind(self.can_manage_menu)
        .bind(db::now())
        .fetch_one(executor)
        .await?)
    }
}

impl RestaurantManager {
    pub const fn restaurant_id(&self) -> Uuid {
        self.restaurant_id
    }
    pub const fn user_id(&self) -> Uuid {
        self.user_id
    }
    /// Whether this manager may administer the restaurant.
    pub fn is_super_admin(&self) -> bool {
        self.role == ManagerRole::SuperAdmin
    }
    /// Whether this manager may edit the menu and tables. Super admins always can.
    pub fn can_manage_menu(&self) -> bool {
        self.is_super_admin() || self.can_manage_menu
    }
    /// Select the link between a restaurant and a user, if any.
    pub async fn select_one<'e, E>(
        restaurant_id: Uuid,
        user_id: Uuid,
        executor: E,
    ) -> Result<Option<Self>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Self>(
            "SELECT * FROM restaurant_managers WHERE restaurant_id = ? AND user_id = ?",
        )
        .bind(restaurant_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?)
    }
    /// Whether a user with the given email already manages the restaurant.
    pub async fn exists_for_email<'e, E>(
        restaurant_id: Uuid,
        email: &str,
        executor: E,
    ) -> Result<bool, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM restaurant_managers rm
            JOIN users u ON u.id = rm.user_id
            WHERE rm.restaurant_id = ? AND u.email = ?",
        )
        .bind(restaurant_id)
        .bind(email)
        .fetch_one(executor)
        .await?;
        Ok(count > 0)
    }
    /// List the managers of a restaurant with their contact details, oldest first.
    pub async fn select_with_users<'e, E>(
        restaurant_id: Uuid,
        executor: E,
    ) -> Result<Vec<ManagerInfo>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, ManagerInfo>(
            "SELECT rm.user_id, u.email, u.phone, rm.role, rm.can_manage_menu,
                rm.created_at AS joined_at
            FROM restaurant_managers rm
            JOIN users u ON u.id = rm.user_id
            WHERE rm.restaurant_id = ?
            ORDER BY rm.created_at ASC, rm.rowid ASC",
        )
        .bind(restaurant_id)
        .fetch_all(executor)
        .await?)
    }
    /// Update the database record to match the model's current state.
    pub async fn update<'e, E>(&self, executor: E) -> Result<(), DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        query(
            "UPDATE restaurant_managers SET role = ?, can_manage_menu = ?
            WHERE restaurant_id = ? AND user_id = ?",
        )
        .bind(self.role)
        .bind(self.can_manage_menu)
        .bind(self.restaurant_id)
        .bind(self.user_id)
        .execute(executor)
        .await?;
        Ok(())
    }
    /// Delete the corresponding record.
    pub async fn delete<'e, E>(self, executor: E) -> Result<(), DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        query("DELETE FROM restaurant_managers WHERE restaurant_id = ? AND user_id = ?")
            .bind(self.restaurant_id)
            .bind(self.user_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
