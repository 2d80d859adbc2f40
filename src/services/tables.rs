//! Restaurant tables and the unique codes customers reach them by.
use nanoid::nanoid;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    constants::tables::{TABLE_CODE_ALPHABET, TABLE_CODE_LENGTH, TABLE_CODE_MAX_ATTEMPTS},
    db::{
        self,
        models::table::{Table, TableInsert},
    },
    services::access::{self, Permission},
};

/// A table along with the URL its QR code points to.
#[derive(Serialize)]
pub struct TableWithUrl {
    #[serde(flatten)]
    pub table: Table,
    pub qr_url: String,
}

/// The response to a code refresh.
#[derive(Serialize)]
pub struct RefreshedCode {
    pub table_id: Uuid,
    pub unique_code: String,
    pub qr_url: String,
}

/// Everything needed to print a table's QR code.
#[derive(Serialize)]
pub struct TableQrUrl {
    pub table_id: Uuid,
    pub table_name: String,
    pub unique_code: String,
    pub qr_url: String,
}

/// The customer-facing URL encoded into a table's QR code.
pub fn qr_url(base_url: &str, restaurant_id: Uuid, unique_code: &str) -> String {
    format!(
        "{}/m/{restaurant_id}/{unique_code}",
        base_url.trim_end_matches('/')
    )
}

/// Draw a fresh candidate table code.
pub fn generate_code() -> String {
    nanoid!(TABLE_CODE_LENGTH, TABLE_CODE_ALPHABET)
}

fn with_url(table: Table, base_url: &str) -> TableWithUrl {
    let qr_url = qr_url(base_url, table.restaurant_id(), &table.unique_code);
    TableWithUrl { table, qr_url }
}

fn clean_name(name: &str) -> Result<String, errors::TableError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(errors::TableError::InvalidName)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Load a table, checking that it belongs to the restaurant.
pub async fn owned_table(
    restaurant_id: Uuid,
    table_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<Table, errors::TableError> {
    Table::select_one(table_id, db_conn)
        .await?
        .filter(|table| table.restaurant_id() == restaurant_id)
        .ok_or(errors::TableError::TableNonExistent(table_id))
}

/// Create a table with a fresh unique code, redrawing on collision.
pub async fn create_table(
    restaurant_id: Uuid,
    user_id: Uuid,
    name: &str,
    base_url: &str,
    db_conn: &db::ConnectionPool,
) -> Result<TableWithUrl, errors::TableError> {
    access::require(restaurant_id, user_id, Permission::ManageMenu, db_conn).await?;
    let name = clean_name(name)?;
    let table = store_with_unique_code(restaurant_id, &name, generate_code, db_conn).await?;
    Ok(with_url(table, base_url))
}

/// Insert a table with a code from `draw`, redrawing while the code is taken.
async fn store_with_unique_code(
    restaurant_id: Uuid,
    name: &str,
    mut draw: impl FnMut() -> String,
    db_conn: &db::ConnectionPool,
) -> Result<Table, errors::TableError> {
    for attempt in 1..=TABLE_CODE_MAX_ATTEMPTS {
        let insert = TableInsert {
            restaurant_id,
            name: name.to_owned(),
            unique_code: draw(),
        };
        match insert.store(db_conn).await {
            Ok(table) => return Ok(table),
            Err(err) if err.is_unique_violation() => {
                tracing::warn!(attempt, "table code collision, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(errors::TableError::CodesExhausted)
}

pub async fn list_tables(
    restaurant_id: Uuid,
    user_id: Uuid,
    base_url: &str,
    db_conn: &db::ConnectionPool,
) -> Result<Vec<TableWithUrl>, errors::TableError> {
    access::require(restaurant_id, user_id, Permission::View, db_conn).await?;
    Ok(Table::select_for_restaurant(restaurant_id, db_conn)
        .await?
        .into_iter()
        .map(|table| with_url(table, base_url))
        .collect())
}

pub async fn update_table(
    restaurant_id: Uuid,
    table_id: Uuid,
    user_id: Uuid,
    name: Option<String>,
    base_url: &str,
    db_conn: &db::ConnectionPool,
) -> Result<TableWithUrl, errors::TableError> {
    access::require(restaurant_id, user_id, Permission::ManageMenu, db_conn).await?;
    let name = name.ok_or(errors::TableError::NoChanges)?;
    let mut table = owned_table(restaurant_id, table_id, db_conn).await?;
    table.name = clean_name(&name)?;
    table.update(db_conn).await?;
    Ok(with_url(table, base_url))
}

pub async fn delete_table(
    restaurant_id: Uuid,
    table_id: Uuid,
    user_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<(), errors::TableError> {
    access::require(restaurant_id, user_id, Permission::ManageMenu, db_conn).await?;
    owned_table(restaurant_id, table_id, db_conn)
        .await?
        .delete(db_conn)
        .await?;
    Ok(())
}

/// Replace a table's code, invalidating any QR codes printed for the old one.
pub async fn refresh_code(
    restaurant_id: Uuid,
    table_id: Uuid,
    user_id: Uuid,
    base_url: &str,
    db_conn: &db::ConnectionPool,
) -> Result<RefreshedCode, errors::TableError> {
    access::require(restaurant_id, user_id, Permission::ManageMenu, db_conn).await?;
    let mut table = owned_table(restaurant_id, table_id, db_conn).await?;
    for attempt in 1..=TABLE_CODE_MAX_ATTEMPTS {
        table.unique_code = generate_code();
        match table.update(db_conn).await {
            Ok(()) => {
                tracing::info!(%restaurant_id, %table_id, "table code refreshed");
                return Ok(RefreshedCode {
                    table_id,
                    qr_url: qr_url(base_url, restaurant_id, &table.unique_code),
                    unique_code: table.unique_code,
                });
            }
            Err(err) if err.is_unique_violation() => {
                tracing::warn!(attempt, "table code collision, retrying");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(errors::TableError::CodesExhausted)
}

pub async fn get_qr_url(
    restaurant_id: Uuid,
    table_id: Uuid,
    user_id: Uuid,
    base_url: &str,
    db_conn: &db::ConnectionPool,
) -> Result<TableQrUrl, errors::TableError> {
    access::require(restaurant_id, user_id, Permission::View, db_conn).await?;
    let table = owned_table(restaurant_id, table_id, db_conn).await?;
    Ok(TableQrUrl {
        table_id,
        qr_url: qr_url(base_url, restaurant_id, &table.unique_code),
        table_name: table.name,
        unique_code: table.unique_code,
    })
}

pub mod errors {
    use thiserror::Error;
    use uuid::Uuid;

    use crate::{db::errors::DatabaseError, services::access::errors::AccessError};

    #[derive(Error, Debug)]
    pub enum TableError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error(transparent)]
        Access(#[from] AccessError),
        #[error("Table not found")]
        TableNonExistent(Uuid),
        #[error("Table name must not be empty")]
        InvalidName,
        #[error("No fields to update")]
        NoChanges,
        #[error("Failed to generate a unique table code")]
        CodesExhausted,
    }
}

#[cfg(test)]
mod tests {
    use super::{errors::TableError, generate_code, qr_url, store_with_unique_code};
    use crate::{
        constants::tables::{TABLE_CODE_ALPHABET, TABLE_CODE_LENGTH, TABLE_CODE_MAX_ATTEMPTS},
        db::{memory_pool, models::restaurant::RestaurantInsert},
    };
    use uuid::Uuid;

    #[tokio::test]
    async fn collisions_are_redrawn() {
        let pool = memory_pool().await;
        let restaurant = RestaurantInsert {
            name: "Diner".to_owned(),
            address: None,
            establishment_year: None,
            google_maps_link: None,
        }
        .store(&pool)
        .await
        .unwrap();
        store_with_unique_code(restaurant.id(), "T1", || "TAKEN000".to_owned(), &pool)
            .await
            .unwrap();

        let mut codes = ["TAKEN000", "TAKEN000", "FRESH000"].into_iter();
        let table = store_with_unique_code(
            restaurant.id(),
            "T2",
            || codes.next().unwrap_or_default().to_owned(),
            &pool,
        )
        .await
        .unwrap();
        assert_eq!(table.unique_code, "FRESH000");
    }

    #[tokio::test]
    async fn gives_up_when_every_code_is_taken() {
        let pool = memory_pool().await;
        let restaurant = RestaurantInsert {
            name: "Diner".to_owned(),
            address: None,
            establishment_year: None,
            google_maps_link: None,
        }
        .store(&pool)
        .await
        .unwrap();
        store_with_unique_code(restaurant.id(), "T1", || "TAKEN000".to_owned(), &pool)
            .await
            .unwrap();

        let mut draws = 0;
        let result = store_with_unique_code(
            restaurant.id(),
            "T2",
            || {
                draws += 1;
                "TAKEN000".to_owned()
            },
            &pool,
        )
        .await;
        assert!(matches!(result, Err(TableError::CodesExhausted)));
        assert_eq!(draws, TABLE_CODE_MAX_ATTEMPTS);
    }

    #[test]
    fn codes_have_the_expected_shape() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), TABLE_CODE_LENGTH);
            assert!(code.chars().all(|c| TABLE_CODE_ALPHABET.contains(&c)));
        }
    }

    #[test]
    fn qr_url_ignores_trailing_slash() {
        let id = Uuid::nil();
        assert_eq!(
            qr_url("https://menu.example.com/", id, "ABCD1234"),
            "https://menu.example.com/m/00000000-0000-0000-0000-000000000000/ABCD1234"
        );
        assert_eq!(
            qr_url("https://menu.example.com", id, "ABCD1234"),
            qr_url("https://menu.example.com/", id, "ABCD1234")
        );
    }
}
