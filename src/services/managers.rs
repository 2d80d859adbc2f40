//! Manager invitations and the management of a restaurant's staff.
use serde::Serialize;
use sha2::{Digest as _, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    constants::tokens::{INVITE_LIFETIME, INVITE_TOKEN_BYTES},
    db::{
        self,
        models::{
            appuser::{AppUser, AppUserInsert},
            invite::{ManagerInvite, ManagerInviteInsert},
            manager::{ManagerInfo, ManagerRole, RestaurantManager, RestaurantManagerInsert},
            password::HashedPassword,
        },
    },
    services::{
        access::{self, Permission},
        auth::check_password_policy,
    },
    utils::{email::EmailAddress, random},
};

/// A newly issued invite. The plaintext token is only ever returned here.
#[derive(Serialize)]
pub struct InviteCreated {
    pub invite_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Details supplied by the person redeeming an invite.
pub struct JoinDetails {
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Hash an invite token for storage and lookup.
fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Invite someone by email to manage the restaurant.
pub async fn invite_manager(
    restaurant_id: Uuid,
    inviter_id: Uuid,
    email: &str,
    can_manage_menu: bool,
    db_conn: &db::ConnectionPool,
) -> Result<InviteCreated, errors::InviteError> {
    access::require(restaurant_id, inviter_id, Permission::Administer, db_conn).await?;
    let email = EmailAddress::try_from(email)?;
    if RestaurantManager::exists_for_email(restaurant_id, email.as_str(), db_conn).await? {
        return Err(errors::InviteError::AlreadyManager(email.into()));
    }
    let now = db::now();
    if ManagerInvite::active_exists(restaurant_id, email.as_str(), now, db_conn).await? {
        return Err(errors::InviteError::InviteOutstanding(email.into()));
    }
    ManagerInvite::delete_expired(restaurant_id, email.as_str(), now, db_conn).await?;
    let invite_token = random::hex_token::<INVITE_TOKEN_BYTES>()?;
    let invite = ManagerInviteInsert {
        restaurant_id,
        email: email.into(),
        can_manage_menu,
        token_hash: hash_token(&invite_token),
        expires_at: now.saturating_add(INVITE_LIFETIME),
    }
    .store(db_conn)
    .await?;
    tracing::info!(%restaurant_id, %inviter_id, "manager invite issued");
    Ok(InviteCreated {
        invite_token,
        expires_at: invite.expires_at,
    })
}

/// Redeem an invite, creating the user if they are new. Existing users must
/// prove ownership of the account with its password.
pub async fn join_restaurant(
    restaurant_id: Uuid,
    token: &str,
    details: JoinDetails,
    db_conn: &db::ConnectionPool,
) -> Result<AppUser, errors::JoinError> {
    let email = EmailAddress::try_from(details.email.as_str())?;
    let now = db::now();

    let mut tx = db_conn.begin().await.map_err(db::errors::DatabaseError::from)?;
    let invite = ManagerInvite::select_by_token_hash(restaurant_id, &hash_token(token), &mut *tx)
        .await?
        .filter(|invite| !invite.is_expired(now))
        .ok_or(errors::JoinError::InvalidInvite)?;
    if email.as_str() != invite.email {
        return Err(errors::JoinError::EmailMismatch);
    }
    let user = match AppUser::select_by_email(&email, &mut *tx).await? {
        Some(mut user) => {
            if !user.verify_password(&details.password).await? {
                return Err(errors::JoinError::InvalidCredentials);
            }
            if RestaurantManager::select_one(restaurant_id, user.id(), &mut *tx)
                .await?
                .is_some()
            {
                return Err(errors::JoinError::AlreadyManager);
            }
            if user.phone.is_none() {
                if let Some(phone) = details.phone.filter(|phone| !phone.trim().is_empty()) {
                    user.phone = Some(phone);
                    user.update(&mut *tx).await?;
                }
            }
            user
        }
        None => {
            check_password_policy(&details.password)?;
            let phone = details.phone.filter(|phone| !phone.trim().is_empty());
            let password = HashedPassword::new_blocking(&details.password).await?;
            AppUserInsert::new(email, phone, password)
                .store(&mut *tx)
                .await
                .map_err(already_manager_on_conflict)?
        }
    };
    RestaurantManagerInsert {
        restaurant_id: invite.restaurant_id(),
        user_id: user.id(),
        role: ManagerRole::Manager,
        can_manage_menu: invite.can_manage_menu,
    }
    .store(&mut *tx)
    .await
    .map_err(already_manager_on_conflict)?;
    if !invite.delete(&mut *tx).await? {
        return Err(errors::JoinError::InvalidInvite);
    }
    tx.commit().await.map_err(db::errors::DatabaseError::from)?;
    tracing::info!(%restaurant_id, user_id = %user.id(), "manager joined restaurant");
    Ok(user)
}

/// A concurrent redemption of the same invite surfaces as a unique violation.
fn already_manager_on_conflict(err: db::errors::DatabaseError) -> errors::JoinError {
    if err.is_unique_violation() {
        errors::JoinError::AlreadyManager
    } else {
        err.into()
    }
}

/// List the managers of a restaurant.
pub async fn list_managers(
    restaurant_id: Uuid,
    user_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<Vec<ManagerInfo>, errors::ManagerError> {
    access::require(restaurant_id, user_id, Permission::View, db_conn).await?;
    Ok(RestaurantManager::select_with_users(restaurant_id, db_conn).await?)
}

/// Remove another manager from the restaurant.
pub async fn remove_manager(
    restaurant_id: Uuid,
    acting_user_id: Uuid,
    target_user_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<(), errors::ManagerError> {
    access::require(restaurant_id, acting_user_id, Permission::Administer, db_conn).await?;
    if acting_user_id == target_user_id {
        return Err(errors::ManagerError::CannotRemoveSelf);
    }
    let target = RestaurantManager::select_one(restaurant_id, target_user_id, db_conn)
        .await?
        .ok_or(errors::ManagerError::NotManager(target_user_id))?;
    target.delete(db_conn).await?;
    tracing::info!(%restaurant_id, %acting_user_id, %target_user_id, "manager removed");
    Ok(())
}

/// Grant or revoke a manager's menu permission.
pub async fn update_manager_permissions(
    restaurant_id: Uuid,
    acting_user_id: Uuid,
    target_user_id: Uuid,
    can_manage_menu: bool,
    db_conn: &db::ConnectionPool,
) -> Result<(), errors::ManagerError> {
    access::require(restaurant_id, acting_user_id, Permission::Administer, db_conn).await?;
    let mut target = RestaurantManager::select_one(restaurant_id, target_user_id, db_conn)
        .await?
        .ok_or(errors::ManagerError::NotManager(target_user_id))?;
    if target.is_super_admin() {
        return Err(errors::ManagerError::SuperAdminImmutable);
    }
    target.can_manage_menu = can_manage_menu;
    target.update(db_conn).await?;
    Ok(())
}

pub mod errors {
    use thiserror::Error;
    use uuid::Uuid;

    use crate::{
        db::errors::DatabaseError,
        services::{access::errors::AccessError, auth::errors::PasswordPolicyError},
        utils::email::InvalidEmailAddress,
    };

    #[derive(Error, Debug)]
    pub enum InviteError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error(transparent)]
        Access(#[from] AccessError),
        #[error(transparent)]
        InvalidEmail(#[from] InvalidEmailAddress),
        #[error("Random source unavailable: {0}")]
        Random(#[from] getrandom::Error),
        #[error("User is already a manager of this restaurant")]
        AlreadyManager(String),
        #[error("An active invite already exists for this email")]
        InviteOutstanding(String),
    }

    #[derive(Error, Debug)]
    pub enum JoinError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error(transparent)]
        InvalidEmail(#[from] InvalidEmailAddress),
        #[error(transparent)]
        PasswordPolicy(#[from] PasswordPolicyError),
        #[error("Invalid or expired invite")]
        InvalidInvite,
        #[error("Email does not match the invite")]
        EmailMismatch,
        #[error("Invalid email or password")]
        InvalidCredentials,
        #[error("User is already a manager of this restaurant")]
        AlreadyManager,
        #[error("Password hashing task failed: {0}")]
        Hashing(#[from] tokio::task::JoinError),
    }

    #[derive(Error, Debug)]
    pub enum ManagerError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error(transparent)]
        Access(#[from] AccessError),
        #[error("Cannot remove yourself as a manager")]
        CannotRemoveSelf,
        #[error("Manager not found")]
        NotManager(Uuid),
        #[error("Super admin permissions cannot be changed")]
        SuperAdminImmutable,
    }
}
