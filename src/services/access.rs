//! Restaurant-scoped authorisation. A user's standing in a restaurant is
//! their `restaurant_managers` row.
use sqlx::SqliteExecutor;
use uuid::Uuid;

use crate::db::models::manager::RestaurantManager;

/// What an operation needs the caller to be allowed to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    /// Read restaurant data. Any manager.
    View,
    /// Edit the menu and tables.
    ManageMenu,
    /// Change the restaurant itself and its managers. Super admins only.
    Administer,
}

impl Permission {
    /// Whether the given manager row grants this permission.
    pub fn granted_to(self, manager: &RestaurantManager) -> bool {
        match self {
            Self::View => true,
            Self::ManageMenu => manager.can_manage_menu(),
            Self::Administer => manager.is_super_admin(),
        }
    }
}

/// Ensure `user_id` holds `permission` at the restaurant and return their
/// manager row.
pub async fn require<'e, E>(
    restaurant_id: Uuid,
    user_id: Uuid,
    permission: Permission,
    executor: E,
) -> Result<RestaurantManager, errors::AccessError>
where
    E: SqliteExecutor<'e>,
{
    let manager = RestaurantManager::select_one(restaurant_id, user_id, executor)
        .await?
        .ok_or(errors::AccessError::NotManager {
            restaurant_id,
            user_id,
        })?;
    if permission.granted_to(&manager) {
        Ok(manager)
    } else {
        Err(errors::AccessError::Insufficient {
            restaurant_id,
            user_id,
            permission,
        })
    }
}

pub mod errors {
    use thiserror::Error;
    use uuid::Uuid;

    use super::Permission;
    use crate::db::errors::DatabaseError;

    #[derive(Error, Debug)]
    pub enum AccessError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error("Access denied")]
        NotManager { restaurant_id: Uuid, user_id: Uuid },
        #[error("Insufficient permissions")]
        Insufficient {
            restaurant_id: Uuid,
            user_id: Uuid,
            permission: Permission,
        },
    }
}
