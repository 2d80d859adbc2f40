//! Models mapping to the tables table: the physical tables of a restaurant,
//! each identified publicly by a random unique code.
use serde::Serialize;
use sqlx::{query, query_as, SqliteExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{self, errors::DatabaseError};

/// INSERT model for a `Table`.
pub struct TableInsert {
    pub restaurant_id: Uuid,
    pub name: String,
    pub unique_code: String,
}

/// A stored restaurant table.
#[derive(sqlx::FromRow, Serialize, Clone, Debug)]
pub struct Table {
    id: Uuid,
    restaurant_id: Uuid,
    pub name: String,
    pub unique_code: String,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl TableInsert {
    /// Store this INSERT model in the database. Fails with a unique violation
    /// when the code is already taken.
    pub async fn store<'e, E>(self, executor: E) -> Result<Table, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Table>(
            "INSERT INTO tables (id, restaurant_id, name, unique_code, created_at)
            VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(self.restaurant_id)
        .bind(self.name)
        .bind(self.unique_code)
        .bind(db::now())
        .fetch_one(executor)
        .await?)
    }
}

impl Table {
    pub const fn id(&self) -> Uuid {
        self.id
    }
    pub const fn restaurant_id(&self) -> Uuid {
        self.restaurant_id
    }
    /// Select a table by ID.
    pub async fn select_one<'e, E>(id: Uuid, executor: E) -> Result<Option<Self>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Self>("SELECT * FROM tables WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }
    /// Select a table by its public unique code.
    pub async fn select_by_code<'e, E>(
        unique_code: &str,
        executor: E,
    ) -> Result<Option<Self>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Self>("SELECT * FROM tables WHERE unique_code = ?")
            .bind(unique_code)
            .fetch_optional(executor)
            .await?)
    }
    /// Select every table of a restaurant, newest first.
    pub async fn select_for_restaurant<'e, E>(
        restaurant_id: Uuid,
        executor: E,
    ) -> Result<Vec<Self>, DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        Ok(query_as::<_, Self>(
            "SELECT * FROM tables WHERE restaurant_id = ?
            ORDER BY created_at DESC, rowid DESC",
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
        query("UPDATE tables SET name = ?, unique_code = ? WHERE id = ?")
            .bind(&self.name)
            .bind(&self.unique_code)
            .bind(self.id)
            .execute(executor)
            .await?;
        Ok(())
    }
    /// Delete the corresponding record. The table's orders cascade.
    pub async fn delete<'e, E>(self, executor: E) -> Result<(), DatabaseError>
    where
        E: SqliteExecutor<'e>,
    {
        query("DELETE FROM tables WHERE id = ?")
            .bind(self.id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
