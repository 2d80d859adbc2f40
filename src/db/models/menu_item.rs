//! Models mapping to the menu_items table.
use serde::Serialize;
use sqlx::{query, query_as, SqliteExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{self, errors::DatabaseError};

/// INSERT model for a `MenuItem`.
pub struct MenuItemInsert {
    pub section_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Price in minor currency units.
    pub price: i64,
    pub display_order: i64,
}

/// A stored menu item.
#[derive(sqlx::FromRow, Serialize, Clone, Debug)]
pub struct MenuItem {
    id: Uuid,
    section_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Price in minor currency units.
    pub price: i64,
    pub available: bool,
    pub display_order: i64,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

/// A menu item along with the restaurant that owns its section.
#[derive(sqlx::FromRow, Debug)]
pub struct ScopedMenuItem {
    #[sqlx(flatten)]
    pub item: MenuItem,
    pub restaurant_id: Uuid,
}

impl MenuItemInsert {
    /// Store this INSERT model in the database. New items are available.
    pub async fn store<'e, E>(self, executor: E) -> Result<MenuItem, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, MenuItem>(
            "INSERT INTO menu_items
            (id, section_id, name, description, price, available, display_order, created_at)
            VALUES (?, ?, ?, ?, ?, TRUE, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(self.section_id)
        .bind(self.name)
        .bind(self.description)
        .bind(self.price)
        .bind(self.display_order)
        .bind(db::now())
        .fetch_one(executor)
        .await?)
    }
}

impl MenuItem {
    pub const fn id(&self) -> Uuid {
        self.id
    }
    pub const fn section_id(&self) -> Uuid {
        self.section_id
    }
    /// Select an item by ID together with its owning restaurant.
    pub async fn select_scoped<'e, E>(
        id: Uuid,
        executor: E,
    ) -> Result<Option<ScopedMenuItem>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, ScopedMenuItem>(
            "SELECT i.*, s.restaurant_id
            FROM menu_items i
            JOIN menu_sections s ON s.id = i.section_id
            WHERE i.id = ?",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?)
    }
    /// Select every item of a restaurant, ordered by section then item display order.
    /// With `available_only`, hidden items are left out.
    pub async fn select_for_restaurant<'e, E>(
        restaurant_id: Uuid,
        available_only: bool,
        executor: E,
    ) -> Result<Vec<Self>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Self>(
            "SELECT i.*
            FROM menu_items i
            JOIN menu_sections s ON s.id = i.section_id
            WHERE s.restaurant_id = ? AND (i.available OR NOT ?)
            ORDER BY s.display_order ASC, i.display_order ASC, i.created_at ASC, i.rowid ASC",
        )
        .bind(restaurant_id)
        .bind(available_only)
        .fetch_all(executor)
        .await?)
    }
    /// Select the items of one section in display order.
    pub async fn select_for_section<'e, E>(
        section_id: Uuid,
        executor: E,
    ) -> Result<Vec<Self>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Self>(
            "SELECT * FROM menu_items WHERE section_id = ?
            ORDER BY display_order ASC, created_at ASC, rowid ASC",
        )
        .bind(section_id)
        .fetch_all(executor)
        .await?)
    }
    /// The display order a new item appended to the section should take.
    pub async fn next_display_order<'e, E>(
        section_id: Uuid,
        executor: E,
    ) -> Result<i64, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(sqlx::query_scalar(
            "SELECT COALESCE(MAX(display_order), 0) + 1 FROM menu_items WHERE section_id = ?",
        )
        .bind(section_id)
        .fetch_one(executor)
        .await?)
    }
    /// Set only the display order of an item.
    pub async fn set_display_order<'e, E>(
        id: Uuid,
        display_order: i64,
        executor: E,
    ) -> Result<(), DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        query("UPDATE menu_items SET display_order = ? WHERE id = ?")
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
        query(
            "UPDATE menu_items
            SET name = ?, description = ?, price = ?, available = ?, display_order = ?
            WHERE id = ?",
        )
        .bind(&self.name)
        .bind(&self.description)
        .bind(self.price)
        .bind(self.available)
        .bind(self.display_order)
        .bind(self.id)
        .execute(executor)
        .await?;
        Ok(())
    }
    /// Delete the corresponding record. Past orders keep their snapshot.
    pub async fn delete<'e, E>(self, executor: E) -> Result<(), DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        query("DELETE FROM menu_items WHERE id = ?")
            .bind(self.id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
