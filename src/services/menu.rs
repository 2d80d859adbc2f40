//! Menu management: sections, items, their ordering, and the menu views
//! served to managers and customers.
use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{
        self,
        models::{
            menu_item::{MenuItem, MenuItemInsert},
            menu_section::{MenuSection, MenuSectionInsert},
            restaurant::Restaurant,
            table::Table,
        },
    },
    services::{
        access::{self, Permission},
        ordering,
    },
};

/// A section together with its items, both in display order.
#[derive(Serialize)]
pub struct SectionWithItems {
    #[serde(flatten)]
    pub section: MenuSection,
    pub items: Vec<MenuItem>,
}

#[derive(Serialize)]
pub struct PublicRestaurant {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct PublicTable {
    pub id: Uuid,
    pub name: String,
}

/// The menu a customer sees after scanning a table's QR code.
#[derive(Serialize)]
pub struct PublicMenu {
    pub restaurant: PublicRestaurant,
    pub table: PublicTable,
    pub sections: Vec<SectionWithItems>,
}

/// Fields of a section that may be changed.
#[derive(Default)]
pub struct SectionUpdate {
    pub name: Option<String>,
    pub display_order: Option<i64>,
}

/// Fields of a new menu item.
pub struct NewMenuItem {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub display_order: Option<i64>,
}

/// Fields of a menu item that may be changed.
#[derive(Default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub display_order: Option<i64>,
}

fn clean_name(name: &str) -> Result<String, errors::MenuError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(errors::MenuError::InvalidName)
    } else {
        Ok(trimmed.to_owned())
    }
}

fn check_price(price: i64) -> Result<i64, errors::MenuError> {
    if price < 0 {
        Err(errors::MenuError::InvalidPrice(price))
    } else {
        Ok(price)
    }
}

/// Group items under their sections. Sections without items are kept.
fn group_items(sections: Vec<MenuSection>, items: Vec<MenuItem>) -> Vec<SectionWithItems> {
    let mut by_section: HashMap<Uuid, Vec<MenuItem>> = HashMap::new();
    for item in items {
        by_section.entry(item.section_id()).or_default().push(item);
    }
    sections
        .into_iter()
        .map(|section| SectionWithItems {
            items: by_section.remove(&section.id()).unwrap_or_default(),
            section,
        })
        .collect()
}

/// Load a section, checking that it belongs to the restaurant.
async fn owned_section(
    restaurant_id: Uuid,
    section_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<MenuSection, errors::MenuError> {
    MenuSection::select_one(section_id, db_conn)
        .await?
        .filter(|section| section.restaurant_id() == restaurant_id)
        .ok_or(errors::MenuError::SectionNonExistent(section_id))
}

/// Load an item and require `permission` on the restaurant that owns it.
async fn authorised_item(
    item_id: Uuid,
    user_id: Uuid,
    permission: Permission,
    db_conn: &db::ConnectionPool,
) -> Result<MenuItem, errors::MenuError> {
    let scoped = MenuItem::select_scoped(item_id, db_conn)
        .await?
        .ok_or(errors::MenuError::ItemNonExistent(item_id))?;
    access::require(scoped.restaurant_id, user_id, permission, db_conn).await?;
    Ok(scoped.item)
}

pub async fn create_section(
    restaurant_id: Uuid,
    user_id: Uuid,
    name: &str,
    display_order: Option<i64>,
    db_conn: &db::ConnectionPool,
) -> Result<MenuSection, errors::MenuError> {
    access::require(restaurant_id, user_id, Permission::ManageMenu, db_conn).await?;
    let name = clean_name(name)?;
    let display_order = match display_order {
        Some(order) => order,
        None => MenuSection::next_display_order(restaurant_id, db_conn).await?,
    };
    Ok(MenuSectionInsert {
        restaurant_id,
        name,
        display_order,
    }
    .store(db_conn)
    .await?)
}

pub async fn list_sections(
    restaurant_id: Uuid,
    user_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<Vec<MenuSection>, errors::MenuError> {
    access::require(restaurant_id, user_id, Permission::View, db_conn).await?;
    Ok(MenuSection::select_for_restaurant(restaurant_id, db_conn).await?)
}

pub async fn update_section(
    restaurant_id: Uuid,
    section_id: Uuid,
    user_id: Uuid,
    update: SectionUpdate,
    db_conn: &db::ConnectionPool,
) -> Result<MenuSection, errors::MenuError> {
    access::require(restaurant_id, user_id, Permission::ManageMenu, db_conn).await?;
    if update.name.is_none() && update.display_order.is_none() {
        return Err(errors::MenuError::NoChanges);
    }
    let mut section = owned_section(restaurant_id, section_id, db_conn).await?;
    if let Some(name) = update.name {
        section.name = clean_name(&name)?;
    }
    if let Some(order) = update.display_order {
        section.display_order = order;
    }
    section.update(db_conn).await?;
    Ok(section)
}

pub async fn delete_section(
    restaurant_id: Uuid,
    section_id: Uuid,
    user_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<(), errors::MenuError> {
    access::require(restaurant_id, user_id, Permission::ManageMenu, db_conn).await?;
    owned_section(restaurant_id, section_id, db_conn)
        .await?
        .delete(db_conn)
        .await?;
    Ok(())
}

/// Set explicit display orders for several sections at once.
pub async fn reorder_sections(
    restaurant_id: Uuid,
    user_id: Uuid,
    orders: Vec<(Uuid, i64)>,
    db_conn: &db::ConnectionPool,
) -> Result<(), errors::MenuError> {
    access::require(restaurant_id, user_id, Permission::ManageMenu, db_conn).await?;
    if orders.is_empty() {
        return Err(errors::MenuError::EmptyReorder);
    }
    let mut tx = db_conn.begin().await.map_err(db::errors::DatabaseError::from)?;
    for (section_id, display_order) in orders {
        MenuSection::select_one(section_id, &mut *tx)
            .await?
            .filter(|section| section.restaurant_id() == restaurant_id)
            .ok_or(errors::MenuError::SectionNonExistent(section_id))?;
        MenuSection::set_display_order(section_id, display_order, &mut *tx).await?;
    }
    tx.commit().await.map_err(db::errors::DatabaseError::from)?;
    Ok(())
}

/// Drag a section to `position` (zero-based) and renumber all sections of the
/// restaurant contiguously. Returns the new ordering.
pub async fn move_section(
    restaurant_id: Uuid,
    section_id: Uuid,
    user_id: Uuid,
    position: usize,
    db_conn: &db::ConnectionPool,
) -> Result<Vec<MenuSection>, errors::MenuError> {
    access::require(restaurant_id, user_id, Permission::ManageMenu, db_conn).await?;
    let mut tx = db_conn.begin().await.map_err(db::errors::DatabaseError::from)?;
    let mut sections = MenuSection::select_for_restaurant(restaurant_id, &mut *tx).await?;
    let from = ordering::position_of(&sections, &section_id, MenuSection::id)
        .ok_or(errors::MenuError::SectionNonExistent(section_id))?;
    ordering::move_to(&mut sections, from, position)?;
    let mut reordered = Vec::with_capacity(sections.len());
    for (mut section, display_order) in ordering::assign_display_orders(sections) {
        if section.display_order != display_order {
            MenuSection::set_display_order(section.id(), display_order, &mut *tx).await?;
            section.display_order = display_order;
        }
        reordered.push(section);
    }
    tx.commit().await.map_err(db::errors::DatabaseError::from)?;
    Ok(reordered)
}

pub async fn create_item(
    section_id: Uuid,
    user_id: Uuid,
    new_item: NewMenuItem,
    db_conn: &db::ConnectionPool,
) -> Result<MenuItem, errors::MenuError> {
    let section = MenuSection::select_one(section_id, db_conn)
        .await?
        .ok_or(errors::MenuError::SectionNonExistent(section_id))?;
    access::require(section.restaurant_id(), user_id, Permission::ManageMenu, db_conn).await?;
    let name = clean_name(&new_item.name)?;
    let price = check_price(new_item.price)?;
    let display_order = match new_item.display_order {
        Some(order) => order,
        None => MenuItem::next_display_order(section_id, db_conn).await?,
    };
    Ok(MenuItemInsert {
        section_id,
        name,
        description: new_item.description,
        price,
        display_order,
    }
    .store(db_conn)
    .await?)
}

pub async fn update_item(
    item_id: Uuid,
    user_id: Uuid,
    update: ItemUpdate,
    db_conn: &db::ConnectionPool,
) -> Result<MenuItem, errors::MenuError> {
    let mut item = authorised_item(item_id, user_id, Permission::ManageMenu, db_conn).await?;
    if update.name.is_none()
        && update.description.is_none()
        && update.price.is_none()
        && update.display_order.is_none()
    {
        return Err(errors::MenuError::NoChanges);
    }
    if let Some(name) = update.name {
        item.name = clean_name(&name)?;
    }
    if let Some(description) = update.description {
        item.description = Some(description);
    }
    if let Some(price) = update.price {
        item.price = check_price(price)?;
    }
    if let Some(order) = update.display_order {
        item.display_order = order;
    }
    item.update(db_conn).await?;
    Ok(item)
}

pub async fn delete_item(
    item_id: Uuid,
    user_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<(), errors::MenuError> {
    authorised_item(item_id, user_id, Permission::ManageMenu, db_conn)
        .await?
        .delete(db_conn)
        .await?;
    Ok(())
}

/// Show or hide an item on the customer menu.
pub async fn set_item_availability(
    item_id: Uuid,
    user_id: Uuid,
    available: bool,
    db_conn: &db::ConnectionPool,
) -> Result<MenuItem, errors::MenuError> {
    let mut item = authorised_item(item_id, user_id, Permission::ManageMenu, db_conn).await?;
    item.available = available;
    item.update(db_conn).await?;
    Ok(item)
}

/// Set explicit display orders for several items, possibly across sections
/// and restaurants. All or nothing. Returns the number of items updated.
pub async fn reorder_items(
    user_id: Uuid,
    orders: Vec<(Uuid, i64)>,
    db_conn: &db::ConnectionPool,
) -> Result<usize, errors::MenuError> {
    if orders.is_empty() {
        return Err(errors::MenuError::EmptyReorder);
    }
    let mut checked_restaurants = HashSet::new();
    let mut tx = db_conn.begin().await.map_err(db::errors::DatabaseError::from)?;
    for &(item_id, display_order) in &orders {
        let scoped = MenuItem::select_scoped(item_id, &mut *tx)
            .await?
            .ok_or(errors::MenuError::ItemNonExistent(item_id))?;
        if checked_restaurants.insert(scoped.restaurant_id) {
            access::require(scoped.restaurant_id, user_id, Permission::ManageMenu, &mut *tx)
                .await?;
        }
        MenuItem::set_display_order(item_id, display_order, &mut *tx).await?;
    }
    tx.commit().await.map_err(db::errors::DatabaseError::from)?;
    Ok(orders.len())
}

/// Drag an item to `position` (zero-based) within its section and renumber the
/// section's items. Returns the section's new ordering.
pub async fn move_item(
    item_id: Uuid,
    user_id: Uuid,
    position: usize,
    db_conn: &db::ConnectionPool,
) -> Result<Vec<MenuItem>, errors::MenuError> {
    let item = authorised_item(item_id, user_id, Permission::ManageMenu, db_conn).await?;
    let mut tx = db_conn.begin().await.map_err(db::errors::DatabaseError::from)?;
    let mut items = MenuItem::select_for_section(item.section_id(), &mut *tx).await?;
    let from = ordering::position_of(&items, &item_id, MenuItem::id)
        .ok_or(errors::MenuError::ItemNonExistent(item_id))?;
    ordering::move_to(&mut items, from, position)?;
    let mut reordered = Vec::with_capacity(items.len());
    for (mut item, display_order) in ordering::assign_display_orders(items) {
        if item.display_order != display_order {
            MenuItem::set_display_order(item.id(), display_order, &mut *tx).await?;
            item.display_order = display_order;
        }
        reordered.push(item);
    }
    tx.commit().await.map_err(db::errors::DatabaseError::from)?;
    Ok(reordered)
}

/// The full menu for managers, hidden items included.
pub async fn admin_menu(
    restaurant_id: Uuid,
    user_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<Vec<SectionWithItems>, errors::MenuError> {
    access::require(restaurant_id, user_id, Permission::View, db_conn).await?;
    let sections = MenuSection::select_for_restaurant(restaurant_id, db_conn).await?;
    let items = MenuItem::select_for_restaurant(restaurant_id, false, db_conn).await?;
    Ok(group_items(sections, items))
}

/// The customer menu for a table. Only available items are listed.
pub async fn public_menu(
    restaurant_id: Uuid,
    table_code: &str,
    db_conn: &db::ConnectionPool,
) -> Result<PublicMenu, errors::PublicMenuError> {
    let table = Table::select_by_code(table_code, db_conn)
        .await?
        .filter(|table| table.restaurant_id() == restaurant_id)
        .ok_or_else(|| errors::PublicMenuError::TableNonExistent(table_code.to_owned()))?;
    let restaurant = Restaurant::select_one(restaurant_id, db_conn)
        .await?
        .ok_or(errors::PublicMenuError::RestaurantNonExistent(restaurant_id))?;
    let sections = MenuSection::select_for_restaurant(restaurant_id, db_conn).await?;
    let items = MenuItem::select_for_restaurant(restaurant_id, true, db_conn).await?;
    Ok(PublicMenu {
        restaurant: PublicRestaurant {
            id: restaurant.id(),
            name: restaurant.name,
            address: restaurant.address,
        },
        table: PublicTable {
            id: table.id(),
            name: table.name,
        },
        sections: group_items(sections, items),
    })
}

pub mod errors {
    use thiserror::Error;
    use uuid::Uuid;

    use crate::{
        db::errors::DatabaseError,
        services::{access::errors::AccessError, ordering::errors::OrderingError},
    };

    #[derive(Error, Debug)]
    pub enum MenuError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error(transparent)]
        Access(#[from] AccessError),
        #[error(transparent)]
        Ordering(#[from] OrderingError),
        #[error("Menu section not found")]
        SectionNonExistent(Uuid),
        #[error("Menu item not found")]
        ItemNonExistent(Uuid),
        #[error("Name must not be empty")]
        InvalidName,
        #[error("Price must not be negative")]
        InvalidPrice(i64),
        #[error("No fields to update")]
        NoChanges,
        #[error("Nothing to reorder")]
        EmptyReorder,
    }

    #[derive(Error, Debug)]
    pub enum PublicMenuError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error("Table not found")]
        TableNonExistent(String),
        #[error("Restaurant not found")]
        RestaurantNonExistent(Uuid),
    }
}
