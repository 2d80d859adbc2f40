//! Demo data for fresh installations.
use crate::{
    db::{
        self,
        models::{
            appuser::{AppUser, AppUserInsert},
            password::HashedPassword,
            manager::{ManagerRole, RestaurantManagerInsert},
            menu_item::MenuItemInsert,
            menu_section::MenuSectionInsert,
            restaurant::RestaurantInsert,
            table::TableInsert,
        },
    },
    utils::email::EmailAddress,
};

pub const DEMO_EMAIL: &str = "manager@example.com";
pub const DEMO_PASSWORD: &str = "password123";

/// Sections of the demo menu with their items as (name, description, price in cents).
const DEMO_MENU: [(&str, &[(&str, &str, i64)]); 3] = [
    (
        "Appetizers",
        &[
            ("Caesar Salad", "Fresh romaine lettuce with parmesan and croutons", 1299),
            ("Garlic Bread", "Toasted bread with garlic butter", 899),
        ],
    ),
    (
        "Main Courses",
        &[
            ("Grilled Salmon", "Fresh Atlantic salmon with seasonal vegetables", 2499),
            ("Chicken Parmesan", "Breaded chicken breast with marinara and mozzarella", 1999),
            ("Vegetarian Pasta", "Penne with seasonal vegetables in olive oil", 1699),
        ],
    ),
    (
        "Desserts",
        &[
            ("Chocolate Cake", "Rich chocolate cake with vanilla ice cream", 899),
            ("Tiramisu", "Classic Italian dessert", 999),
        ],
    ),
];

/// Seed a demo manager, restaurant, tables and menu if no user exists yet.
/// Returns whether anything was inserted.
pub async fn seed_demo_data(db_conn: &db::ConnectionPool) -> Result<bool, errors::SeedError> {
    if AppUser::count(db_conn).await? > 0 {
        return Ok(false);
    }
    let email = EmailAddress::try_from(DEMO_EMAIL).map_err(|_| errors::SeedError::InvalidEmail)?;
    let password = HashedPassword::new_blocking(DEMO_PASSWORD).await?;

    let mut tx = db_conn.begin().await.map_err(db::errors::DatabaseError::from)?;
    let user = AppUserInsert::new(email, Some("+1234567890".to_owned()), password)
        .store(&mut *tx)
        .await?;
    let restaurant = RestaurantInsert {
        name: "Demo Restaurant".to_owned(),
        address: Some("123 Main St, Demo City, DC 12345".to_owned()),
        establishment_year: Some(2020),
        google_maps_link: Some("https://maps.google.com/demo".to_owned()),
    }
    .store(&mut *tx)
    .await?;
    RestaurantManagerInsert {
        restaurant_id: restaurant.id(),
        user_id: user.id(),
        role: ManagerRole::SuperAdmin,
        can_manage_menu: true,
    }
    .store(&mut *tx)
    .await?;
    for (name, unique_code) in [("Table 1", "TBL00001"), ("Table 2", "TBL00002")] {
        TableInsert {
            restaurant_id: restaurant.id(),
            name: name.to_owned(),
            unique_code: unique_code.to_owned(),
        }
        .store(&mut *tx)
        .await?;
    }
    for ((section_name, items), section_order) in DEMO_MENU.into_iter().zip(1_i64..) {
        let section = MenuSectionInsert {
            restaurant_id: restaurant.id(),
            name: section_name.to_owned(),
            display_order: section_order,
        }
        .store(&mut *tx)
        .await?;
        for (&(name, description, price), item_order) in items.iter().zip(1_i64..) {
            MenuItemInsert {
                section_id: section.id(),
                name: name.to_owned(),
                description: Some(description.to_owned()),
                price,
                display_order: item_order,
            }
            .store(&mut *tx)
            .await?;
        }
    }
    tx.commit().await.map_err(db::errors::DatabaseError::from)?;
    tracing::info!(restaurant_id = %restaurant.id(), "seeded demo data");
    Ok(true)
}

pub mod errors {
    use thiserror::Error;

    use crate::db::errors::DatabaseError;

    #[derive(Error, Debug)]
    pub enum SeedError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error("Demo email address is invalid")]
        InvalidEmail,
        #[error("Password hashing task failed: {0}")]
        Hashing(#[from] tokio::task::JoinError),
    }
}
