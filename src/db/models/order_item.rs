//! Models mapping to the order_items table. Each row snapshots the name and
//! price of a menu item at the time it was ordered.
use serde::Serialize;
use sqlx::{query_as, SqliteExecutor};
use uuid::Uuid;

use crate::db::errors::DatabaseError;

/// INSERT model for an `OrderItem`.
pub struct OrderItemInsert {
    pub order_id: Uuid,
    /// Position of the line within its order, starting at 1.
    pub line_number: i64,
    pub menu_item_id: Uuid,
    pub name: String,
    pub quantity: u32,
    /// Unit price in minor currency units.
    pub price: i64,
    pub special_requests: Option<String>,
}

/// A stored order line.
#[derive(sqlx::FromRow, Serialize, Clone, Debug)]
pub struct OrderItem {
    pub menu_item_id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub price: i64,
    pub special_requests: Option<String>,
}

impl OrderItemInsert {
    /// Store this INSERT model in the database.
    pub async fn store<'e, E>(self, executor: E) -> Result<OrderItem, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, OrderItem>(
            "INSERT INTO order_items
            (order_id, line_number, menu_item_id, name, quantity, price, special_requests)
            VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(self.order_id)
        .bind(self.line_number)
        .bind(self.menu_item_id)
        .bind(self.name)
        .bind(self.quantity)
        .bind(self.price)
        .bind(self.special_requests)
        .fetch_one(executor)
        .await?)
    }
}

impl OrderItem {
    /// Select the lines of an order in the order they were submitted.
    pub async fn select_for_order<'e, E>(
        order_id: Uuid,
        executor: E,
    ) -> Result<Vec<Self>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Self>(
            "SELECT * FROM order_items WHERE order_id = ? ORDER BY line_number ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?)
    }
}
