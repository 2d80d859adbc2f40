//! Customer order placement and the staff order dashboard.
use serde::Serialize;
use time::{OffsetDateTime, Time};
use uuid::Uuid;

use crate::{
    constants::orders::{MAX_LINE_QUANTITY, MAX_ORDER_LINES},
    db::{
        self,
        models::{
            apporder::{AppOrder, AppOrderInContext, AppOrderInsert, AppOrderStatus},
            menu_item::MenuItem,
            order_item::{OrderItem, OrderItemInsert},
            table::Table,
        },
    },
    services::access::{self, Permission},
};

/// One line of a customer's cart.
pub struct OrderLine {
    pub menu_item_id: Uuid,
    /// As submitted; checked against the per-line limit before use.
    pub quantity: i64,
    pub special_requests: Option<String>,
}

/// A customer's submitted cart.
pub struct NewOrder {
    pub table_code: String,
    pub customer_name: Option<String>,
    pub items: Vec<OrderLine>,
}

/// An order with its lines and the table and restaurant it was placed at.
#[derive(Serialize)]
pub struct OrderView {
    pub id: Uuid,
    pub table_id: Uuid,
    pub table_name: String,
    pub restaurant_id: Uuid,
    pub restaurant_name: String,
    pub customer_name: Option<String>,
    pub items: Vec<OrderItem>,
    pub total_amount: i64,
    pub status: AppOrderStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Sum `price * quantity` over the lines, failing on overflow.
pub fn order_total(lines: &[(i64, u32)]) -> Result<i64, errors::OrderCreationError> {
    lines.iter().try_fold(0_i64, |total, &(price, quantity)| {
        price
            .checked_mul(i64::from(quantity))
            .and_then(|line_total| total.checked_add(line_total))
            .ok_or(errors::OrderCreationError::CostTooLarge)
    })
}

async fn view_of(
    record: AppOrderInContext,
    db_conn: &db::ConnectionPool,
) -> Result<OrderView, db::errors::DatabaseError> {
    let items = OrderItem::select_for_order(record.order.id(), db_conn).await?;
    let order = record.order;
    Ok(OrderView {
        id: order.id(),
        table_id: order.table_id(),
        table_name: record.table_name,
        restaurant_id: record.restaurant_id,
        restaurant_name: record.restaurant_name,
        items,
        total_amount: order.total_amount(),
        status: order.status(),
        created_at: order.created_at(),
        customer_name: order.customer_name,
    })
}

async fn views_of(
    records: Vec<AppOrderInContext>,
    db_conn: &db::ConnectionPool,
) -> Result<Vec<OrderView>, db::errors::DatabaseError> {
    let mut views = Vec::with_capacity(records.len());
    for record in records {
        views.push(view_of(record, db_conn).await?);
    }
    Ok(views)
}

/// Validate a cart against the table's menu and store it as a pending order.
pub async fn create_order(
    new_order: NewOrder,
    db_conn: &db::ConnectionPool,
) -> Result<AppOrder, errors::OrderCreationError> {
    let table = Table::select_by_code(new_order.table_code.trim(), db_conn)
        .await?
        .ok_or_else(|| errors::OrderCreationError::TableNonExistent(new_order.table_code.clone()))?;
    if new_order.items.is_empty() {
        return Err(errors::OrderCreationError::NoItems);
    }
    if new_order.items.len() > MAX_ORDER_LINES {
        return Err(errors::OrderCreationError::TooManyItems);
    }

    let mut priced = Vec::with_capacity(new_order.items.len());
    for line in new_order.items {
        let quantity = u32::try_from(line.quantity)
            .ok()
            .filter(|quantity| (1..=MAX_LINE_QUANTITY).contains(quantity))
            .ok_or(errors::OrderCreationError::InvalidQuantity(line.menu_item_id))?;
        let scoped = MenuItem::select_scoped(line.menu_item_id, db_conn)
            .await?
            .filter(|scoped| scoped.restaurant_id == table.restaurant_id())
            .ok_or(errors::OrderCreationError::ItemNonExistent(line.menu_item_id))?;
        if !scoped.item.available {
            return Err(errors::OrderCreationError::ItemUnavailable(scoped.item.name));
        }
        priced.push((line, quantity, scoped.item));
    }
    let total_amount = order_total(
        &priced
            .iter()
            .map(|(_, quantity, item)| (item.price, *quantity))
            .collect::<Vec<_>>(),
    )?;

    let mut tx = db_conn.begin().await.map_err(db::errors::DatabaseError::from)?;
    let order = AppOrderInsert {
        table_id: table.id(),
        customer_name: blank_to_none(new_order.customer_name),
        total_amount,
    }
    .store(&mut *tx)
    .await?;
    for (line_number, (line, quantity, item)) in (1_i64..).zip(priced) {
        OrderItemInsert {
            order_id: order.id(),
            line_number,
            menu_item_id: item.id(),
            name: item.name,
            quantity,
            price: item.price,
            special_requests: blank_to_none(line.special_requests),
        }
        .store(&mut *tx)
        .await?;
    }
    tx.commit().await.map_err(db::errors::DatabaseError::from)?;
    tracing::info!(order_id = %order.id(), table_id = %table.id(), total_amount, "order placed");
    Ok(order)
}

/// Fetch an order by ID. Public: order IDs are unguessable.
pub async fn get_order(
    order_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<Option<OrderView>, db::errors::DatabaseError> {
    match AppOrder::select_one(order_id, db_conn).await? {
        Some(record) => Ok(Some(view_of(record, db_conn).await?)),
        None => Ok(None),
    }
}

/// Every order of a restaurant, newest first.
pub async fn list_orders(
    restaurant_id: Uuid,
    user_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<Vec<OrderView>, errors::OrderQueryError> {
    access::require(restaurant_id, user_id, Permission::View, db_conn).await?;
    let records = AppOrder::select_for_restaurant(restaurant_id, None, db_conn).await?;
    Ok(views_of(records, db_conn).await?)
}

/// Orders placed since midnight UTC of `now`'s day.
pub async fn list_todays_orders(
    restaurant_id: Uuid,
    user_id: Uuid,
    now: OffsetDateTime,
    db_conn: &db::ConnectionPool,
) -> Result<Vec<OrderView>, errors::OrderQueryError> {
    access::require(restaurant_id, user_id, Permission::View, db_conn).await?;
    let start_of_day = now.replace_time(Time::MIDNIGHT);
    let records =
        AppOrder::select_for_restaurant(restaurant_id, Some(start_of_day), db_conn).await?;
    Ok(views_of(records, db_conn).await?)
}

/// Orders placed at one of the restaurant's tables.
pub async fn list_table_orders(
    restaurant_id: Uuid,
    table_id: Uuid,
    user_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<Vec<OrderView>, errors::OrderQueryError> {
    access::require(restaurant_id, user_id, Permission::View, db_conn).await?;
    Table::select_one(table_id, db_conn)
        .await?
        .filter(|table| table.restaurant_id() == restaurant_id)
        .ok_or(errors::OrderQueryError::TableNonExistent(table_id))?;
    let records = AppOrder::select_for_table(table_id, db_conn).await?;
    Ok(views_of(records, db_conn).await?)
}

/// Advance an order through the kitchen workflow.
pub async fn update_order_status(
    restaurant_id: Uuid,
    order_id: Uuid,
    user_id: Uuid,
    status: AppOrderStatus,
    db_conn: &db::ConnectionPool,
) -> Result<OrderView, errors::OrderStatusError> {
    access::require(restaurant_id, user_id, Permission::View, db_conn).await?;
    let mut record = AppOrder::select_one(order_id, db_conn)
        .await?
        .filter(|record| record.restaurant_id == restaurant_id)
        .ok_or(errors::OrderStatusError::OrderNonExistent(order_id))?;
    let current = record.order.status();
    if !current.can_transition_to(status) {
        return Err(errors::OrderStatusError::InvalidTransition {
            from: current,
            to: status,
        });
    }
    if !record.order.transition_status(status, db_conn).await? {
        let from = AppOrder::select_one(order_id, db_conn)
            .await?
            .map_or(current, |latest| latest.order.status());
        tracing::info!(%order_id, ?current, ?from, "order status changed concurrently");
        return Err(errors::OrderStatusError::InvalidTransition { from, to: status });
    }
    tracing::info!(%restaurant_id, %order_id, ?current, ?status, "order status changed");
    Ok(view_of(record, db_conn).await?)
}

pub mod errors {
    use thiserror::Error;
    use uuid::Uuid;

    use crate::{
        db::{errors::DatabaseError, models::apporder::AppOrderStatus},
        services::access::errors::AccessError,
    };

    #[derive(Error, Debug)]
    pub enum OrderCreationError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error("Table not found")]
        TableNonExistent(String),
        #[error("Order must contain at least one item")]
        NoItems,
        #[error("Order contains too many items")]
        TooManyItems,
        #[error("Invalid quantity for menu item {0}")]
        InvalidQuantity(Uuid),
        #[error("Menu item {0} not found")]
        ItemNonExistent(Uuid),
        #[error("Menu item '{0}' is not available")]
        ItemUnavailable(String),
        #[error("Total cost exceeds 64-bit max")]
        CostTooLarge,
    }

    #[derive(Error, Debug)]
    pub enum OrderQueryError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error(transparent)]
        Access(#[from] AccessError),
        #[error("Table not found")]
        TableNonExistent(Uuid),
    }

    #[derive(Error, Debug)]
    pub enum OrderStatusError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error(transparent)]
        Access(#[from] AccessError),
        #[error("Order not found")]
        OrderNonExistent(Uuid),
        #[error("Cannot change order status from {from:?} to {to:?}")]
        InvalidTransition {
            from: AppOrderStatus,
            to: AppOrderStatus,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{blank_to_none, errors::OrderCreationError, order_total};

    #[test]
    fn totals_multiply_and_sum() {
        assert_eq!(order_total(&[(1299, 2), (899, 1)]).unwrap(), 3497);
        assert_eq!(order_total(&[]).unwrap(), 0);
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        assert!(matches!(
            order_total(&[(i64::MAX, 2)]),
            Err(OrderCreationError::CostTooLarge)
        ));
        assert!(matches!(
            order_total(&[(i64::MAX, 1), (1, 1)]),
            Err(OrderCreationError::CostTooLarge)
        ));
    }

    #[test]
    fn blank_strings_become_none() {
        assert_eq!(blank_to_none(Some("  ".to_owned())), None);
        assert_eq!(blank_to_none(Some(" Ann ".to_owned())), Some("Ann".to_owned()));
        assert_eq!(blank_to_none(None), None);
    }
}
