//! Models mapping to the orders table. An order is placed by a customer at a
//! table and then progresses through the kitchen workflow.
use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, SqliteExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{self, errors::DatabaseError};

/// The lifecycle stage of an order.
#[derive(sqlx::Type, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppOrderStatus {
    /// Submitted by the customer, not yet seen by staff.
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

impl AppOrderStatus {
    /// Whether staff may move an order from this status to `next`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Preparing | Self::Cancelled)
                | (Self::Preparing, Self::Ready)
                | (Self::Ready, Self::Served)
        )
    }
}

/// INSERT model for an `AppOrder`.
pub struct AppOrderInsert {
    pub table_id: Uuid,
    pub customer_name: Option<String>,
    /// Total in minor currency units.
    pub total_amount: i64,
}

/// A stored order.
#[derive(sqlx::FromRow, Serialize, Clone, Debug)]
pub struct AppOrder {
    id: Uuid,
    table_id: Uuid,
    pub customer_name: Option<String>,
    total_amount: i64,
    status: AppOrderStatus,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

/// An order joined with the table and restaurant it was placed at.
#[derive(sqlx::FromRow, Debug)]
pub struct AppOrderInContext {
    #[sqlx(flatten)]
    pub order: AppOrder,
    pub table_name: String,
    pub restaurant_id: Uuid,
    pub restaurant_name: String,
}

/// Shared SELECT for `AppOrderInContext`; callers append WHERE and ORDER BY.
const SELECT_IN_CONTEXT: &str = "SELECT o.*, t.name AS table_name,
    r.id AS restaurant_id, r.name AS restaurant_name
    FROM orders o
    JOIN tables t ON t.id = o.table_id
    JOIN restaurants r ON r.id = t.restaurant_id";

impl AppOrderInsert {
    /// Store this INSERT model in the database as a pending order.
    pub async fn store<'e, E>(self, executor: E) -> Result<AppOrder, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, AppOrder>(
            "INSERT INTO orders (id, table_id, customer_name, total_amount, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(self.table_id)
        .bind(self.customer_name)
        .bind(self.total_amount)
        .bind(AppOrderStatus::Pending)
        .bind(db::now())
        .fetch_one(executor)
        .await?)
    }
}

impl AppOrder {
    pub const fn id(&self) -> Uuid {
        self.id
    }
    pub const fn table_id(&self) -> Uuid {
        self.table_id
    }
    pub const fn total_amount(&self) -> i64 {
        self.total_amount
    }
    pub const fn status(&self) -> AppOrderStatus {
        self.status
    }
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
    /// Select an order with its table and restaurant by ID.
    pub async fn select_one<'e, E>(
        id: Uuid,
        executor: E,
    ) -> Result<Option<AppOrderInContext>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(
            query_as::<_, AppOrderInContext>(&format!("{SELECT_IN_CONTEXT} WHERE o.id = ?"))
                .bind(id)
                .fetch_optional(executor)
                .await?,
        )
    }
    /// Select a restaurant's orders placed at or after `since`, newest first.
    /// Pass `None` for all orders.
    pub async fn select_for_restaurant<'e, E>(
        restaurant_id: Uuid,
        since: Option<OffsetDateTime>,
        executor: E,
    ) -> Result<Vec<AppOrderInContext>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        let sql = format!(
            "{SELECT_IN_CONTEXT}
            WHERE r.id = ? AND (? IS NULL OR o.created_at >= ?)
            ORDER BY o.created_at DESC, o.rowid DESC"
        );
        Ok(query_as::<_, AppOrderInContext>(&sql)
            .bind(restaurant_id)
            .bind(since)
            .bind(since)
            .fetch_all(executor)
            .await?)
    }
    /// Select the orders placed at one table, newest first.
    pub async fn select_for_table<'e, E>(
        table_id: Uuid,
        executor: E,
    ) -> Result<Vec<AppOrderInContext>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        let sql = format!(
            "{SELECT_IN_CONTEXT} WHERE o.table_id = ? ORDER BY o.created_at DESC, o.rowid DESC"
        );
        Ok(query_as::<_, AppOrderInContext>(&sql)
            .bind(table_id)
            .fetch_all(executor)
            .await?)
    }
    /// Move the order to `next`, but only if its stored status still matches
    /// the one this model was read with. Returns whether the row changed; on
    /// success the model reflects the new status.
    pub async fn transition_status<'e, E>(
        &mut self,
        next: AppOrderStatus,
        executor: E,
    ) -> Result<bool, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        let result = query("UPDATE orders SET status = ? WHERE id = ? AND status = ?")
            .bind(next)
            .bind(self.id)
            .bind(self.status)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }
        self.status = next;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::AppOrderStatus::{self, *};

    const ALL: [AppOrderStatus; 6] = [Pending, Confirmed, Preparing, Ready, Served, Cancelled];

    #[test]
    fn happy_path_is_allowed() {
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Served));
    }

    #[test]
    fn only_early_orders_can_be_cancelled() {
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Preparing.can_transition_to(Cancelled));
        assert!(!Ready.can_transition_to(Cancelled));
    }

    #[test]
    fn terminal_states_go_nowhere() {
        for from in [Served, Cancelled] {
            for to in ALL {
                assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn no_skipping_or_going_back() {
        assert!(!Pending.can_transition_to(Ready));
        assert!(!Ready.can_transition_to(Preparing));
        for status in ALL {
            assert!(!status.can_transition_to(status));
        }
    }
}
