//! Models mapping to the restaurants database table.
use serde::Serialize;
use sqlx::{query, query_as, SqliteExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{self, errors::DatabaseError};

use super::manager::ManagerRole;

/// INSERT model for a `Restaurant`.
pub struct RestaurantInsert {
    pub name: String,
    pub address: Option<String>,
    pub establishment_year: Option<i32>,
    pub google_maps_link: Option<String>,
}

/// A `Restaurant` which is stored in the database.
#[derive(sqlx::FromRow, Serialize, Clone, Debug)]
pub struct Restaurant {
    /// The restaurant's ID primary key.
    id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub establishment_year: Option<i32>,
    pub google_maps_link: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

/// A restaurant together with the requesting user's standing in it.
#[derive(sqlx::FromRow, Serialize)]
pub struct RestaurantMembership {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub role: ManagerRole,
    pub can_manage_menu: bool,
}

impl RestaurantInsert {
    /// Store this INSERT model in the database and return a complete `Restaurant` model.
    pub async fn store<'e, E>(self, executor: E) -> Result<Restaurant, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Restaurant>(
            "INSERT INTO restaurants
            (id, name, address, establishment_year, google_maps_link, created_at)
            VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(self.name)
        .bind(self.address)
        .bind(self.establishment_year)
        .bind(self.google_maps_link)
        .bind(db::now())
        .fetch_one(executor)
        .await?)
    }
}

impl Restaurant {
    /// Get the restaurant's ID primary key.
    pub const fn id(&self) -> Uuid {
        self.id
    }
    /// Select a `Restaurant` by ID.
    pub async fn select_one<'e, E>(id: Uuid, executor: E) -> Result<Option<Self>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Self>("SELECT * FROM restaurants WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }
    /// Select every restaurant the given user manages, newest first.
    pub async fn select_for_user<'e, E>(
        user_id: Uuid,
        executor: E,
    ) -> Result<Vec<RestaurantMembership>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, RestaurantMembership>(
            "SELECT r.*, rm.role, rm.can_manage_menu
            FROM restaurants r
            JOIN restaurant_managers rm ON rm.restaurant_id = r.id
            WHERE rm.user_id = ?
            ORDER BY r.created_at DESC, r.rowid DESC",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?)
    }
    /// Update the database record to match the model's current state.
    pub async fn update<'e, E>(&self, executor: E) -> Result<(), DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        query(
            "UPDATE restaurants
            SET name = ?, address = ?, establishment_year = ?, google_maps_link = ?
            WHERE id = ?",
        )
        .bind(&self.name)
        .bind(&self.address)
        .bind(self.establishment_year)
        .bind(&self.google_maps_link)
        .bind(self.id)
        .execute(executor)
        .await?;
        Ok(())
    }
    /// Delete the corresponding record. Managers, invites, tables, menu and
    /// orders cascade.
    pub async fn delete<'e, E>(self, executor: E) -> Result<(), DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        query("DELETE FROM restaurants WHERE id = ?")
            .bind(self.id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
