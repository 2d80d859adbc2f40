//! Restaurant lifecycle: creation, lookup, editing and deletion.
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{
        self,
        models::{
            manager::{ManagerInfo, ManagerRole, RestaurantManager, RestaurantManagerInsert},
            restaurant::{Restaurant, RestaurantInsert, RestaurantMembership},
        },
    },
    services::access::{self, Permission},
};

/// A restaurant with its managers, as seen by one of them.
#[derive(Serialize)]
pub struct RestaurantDetails {
    pub restaurant: Restaurant,
    pub managers: Vec<ManagerInfo>,
}

/// Fields of a restaurant that may be changed. `None` leaves a field as is.
#[derive(Default)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub establishment_year: Option<i32>,
    pub google_maps_link: Option<String>,
}

impl RestaurantUpdate {
    const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.establishment_year.is_none()
            && self.google_maps_link.is_none()
    }
}

/// Trim a required name, rejecting blank ones.
fn clean_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Create a restaurant owned by `user_id`, who becomes its super admin.
pub async fn create_restaurant(
    user_id: Uuid,
    mut insert: RestaurantInsert,
    db_conn: &db::ConnectionPool,
) -> Result<Restaurant, errors::RestaurantError> {
    insert.name = clean_name(&insert.name).ok_or(errors::RestaurantError::InvalidName)?;
    let mut tx = db_conn.begin().await.map_err(db::errors::DatabaseError::from)?;
    let restaurant = insert.store(&mut *tx).await?;
    RestaurantManagerInsert {
        restaurant_id: restaurant.id(),
        user_id,
        role: ManagerRole::SuperAdmin,
        can_manage_menu: true,
    }
    .store(&mut *tx)
    .await?;
    tx.commit().await.map_err(db::errors::DatabaseError::from)?;
    tracing::info!(restaurant_id = %restaurant.id(), %user_id, "restaurant created");
    Ok(restaurant)
}

/// List the restaurants a user manages.
pub async fn list_restaurants(
    user_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<Vec<RestaurantMembership>, db::errors::DatabaseError> {
    Restaurant::select_for_user(user_id, db_conn).await
}

/// Fetch a restaurant and its managers.
pub async fn get_restaurant(
    restaurant_id: Uuid,
    user_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<RestaurantDetails, errors::RestaurantError> {
    access::require(restaurant_id, user_id, Permission::View, db_conn).await?;
    let restaurant = Restaurant::select_one(restaurant_id, db_conn)
        .await?
        .ok_or(errors::RestaurantError::RestaurantNonExistent(restaurant_id))?;
    let managers = RestaurantManager::select_with_users(restaurant_id, db_conn).await?;
    Ok(RestaurantDetails {
        restaurant,
        managers,
    })
}

/// Apply a partial update to a restaurant.
pub async fn update_restaurant(
    restaurant_id: Uuid,
    user_id: Uuid,
    update: RestaurantUpdate,
    db_conn: &db::ConnectionPool,
) -> Result<Restaurant, errors::RestaurantError> {
    access::require(restaurant_id, user_id, Permission::Administer, db_conn).await?;
    if update.is_empty() {
        return Err(errors::RestaurantError::NoChanges);
    }
    let mut restaurant = Restaurant::select_one(restaurant_id, db_conn)
        .await?
        .ok_or(errors::RestaurantError::RestaurantNonExistent(restaurant_id))?;
    if let Some(name) = update.name {
        restaurant.name = clean_name(&name).ok_or(errors::RestaurantError::InvalidName)?;
    }
    if let Some(address) = update.address {
        restaurant.address = Some(address);
    }
    if let Some(year) = update.establishment_year {
        restaurant.establishment_year = Some(year);
    }
    if let Some(link) = update.google_maps_link {
        restaurant.google_maps_link = Some(link);
    }
    restaurant.update(db_conn).await?;
    Ok(restaurant)
}

/// Delete a restaurant and everything that belongs to it.
pub async fn delete_restaurant(
    restaurant_id: Uuid,
    user_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<(), errors::RestaurantError> {
    access::require(restaurant_id, user_id, Permission::Administer, db_conn).await?;
    let restaurant = Restaurant::select_one(restaurant_id, db_conn)
        .await?
        .ok_or(errors::RestaurantError::RestaurantNonExistent(restaurant_id))?;
    restaurant.delete(db_conn).await?;
    tracing::info!(%restaurant_id, %user_id, "restaurant deleted");
    Ok(())
}

pub mod errors {
    use thiserror::Error;
    use uuid::Uuid;

    use crate::{db::errors::DatabaseError, services::access::errors::AccessError};

    #[derive(Error, Debug)]
    pub enum RestaurantError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error(transparent)]
        Access(#[from] AccessError),
        #[error("Restaurant not found")]
        RestaurantNonExistent(Uuid),
        #[error("Restaurant name must not be empty")]
        InvalidName,
        #[error("No fields to update")]
        NoChanges,
    }
}
