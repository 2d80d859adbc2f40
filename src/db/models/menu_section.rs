//! Models mapping to the menu_sections table. A section groups menu items
//! (e.g. "Starters") and is shown in `display_order`.
use serde::Serialize;
use sqlx::{query, query_as, SqliteExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{self, errors::DatabaseError};

/// INSERT model for a `MenuSection`.
pub struct MenuSectionInsert {
    pub restaurant_id: Uuid,
    pub name: String,
    pub display_order: i64,
}

/// A stored menu section.
#[derive(sqlx::FromRow, Serialize, Clone, Debug)]
pub struct MenuSection {
    id: Uuid,
    restaurant_id: Uuid,
    pub name: String,
    pub display_order: i64,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl MenuSectionInsert {
    /// Store this INSERT model in the database.
    pub async fn store<'e, E>(self, executor: E) -> Result<MenuSection, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, MenuSection>(
            "INSERT INTO menu_sections (id, restaurant_id, name, display_order, created_at)
            VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(self.restaurant_id)
        .bind(self.name)
        .bind(self.display_order)
        .bind(db::now())
        .fetch_one(executor)
        .await?)
    }
}

impl MenuSection {
    pub const fn id(&self) -> Uuid {
        self.id
    }
    pub const fn restaurant_id(&self) -> Uuid {
        self.restaurant_id
    }
    /// Select a section by ID.
    pub async fn select_one<'e, E>(id: Uuid, executor: E) -> Result<Option<Self>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Self>("SELECT * FROM menu_sections WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }
    /// Select every section of a restaurant in display order.
    pub async fn select_for_restaurant<'e, E>(
        restaurant_id: Uuid,
        executor: E,
    ) -> Result<Vec<Self>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Self>(
            "SELECT * FROM menu_sections WHERE restaurant_id = ?
            ORDER BY display_order ASC, created_at ASC, rowid ASC",
        )
        .bind(restaurant_id)
        .fetch_all(executor)
        .await?)
    }
    /// The display order a new section appended to the restaurant should take.
    pub async fn next_display_order<'e, E>(
        restaurant_id: Uuid,
        executor: E,
    ) -> Result<i64, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(sqlx::query_scalar(
            "SELECT COALESCE(MAX(display_order), 0) + 1 FROM menu_sections WHERE restaurant_id = ?",
        )
        .bind(restaurant_id)
        .fetch_one(executor)
        .await?)
    }
    /// Set only the display order of a section.
    pub async fn set_display_order<'e, E>(
        id: Uuid,
        display_order: i64,
        executor: E,
    ) -> Result<(), DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        query("UPDATE menu_sections SET display_order = ? WHERE id = ?")
            .bind(display_order)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
    /// Update the database record to match the model's current state.
    pub async fn update<'e, E>(&self, executor: E) -> Result<(), DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        query("UPDATE menu_sections SET name = ?, display_order = ? WHERE id = ?")
            .bind(&self.name)
            .bind(self.display_order)
            .bind(self.id)
            .execute(executor)
            .await?;
        Ok(())
    }
    /// Delete the corresponding record. The section's items cascade.
    pub async fn delete<'e, E>(self, executor: E) -> Result<(), DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        query("DELETE FROM menu_sections WHERE id = ?")
            .bind(self.id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
