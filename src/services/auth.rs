//! Registration, login and bearer token handling.
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    constants::passwords::{PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH},
    db::{
        self,
        models::{
            appuser::{AppUser, AppUserInsert},
            password::HashedPassword,
        },
    },
    utils::email::EmailAddress,
};

/// Claims carried by an access token.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    /// The user's ID.
    pub sub: Uuid,
    pub email: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// A freshly signed token and when it stops being accepted.
pub struct IssuedToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

/// HMAC keys and token lifetime, built once at start-up.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, lifetime_hours: u32) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(i64::from(lifetime_hours)),
        }
    }

    /// Sign an access token for the user.
    pub fn issue(&self, user: &AppUser) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let issued_at = db::now();
        let expires_at = issued_at.saturating_add(self.lifetime);
        let claims = Claims {
            sub: user.id(),
            email: user.email().to_owned(),
            iat: issued_at.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Check a token's signature and expiry and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        Ok(decode::<Claims>(token, &self.decoding, &validation)?.claims)
    }
}

/// Check a new password against the length policy.
pub fn check_password_policy(password: &str) -> Result<(), errors::PasswordPolicyError> {
    let length = password.chars().count();
    if length < PASSWORD_MIN_LENGTH {
        Err(errors::PasswordPolicyError::TooShort)
    } else if length > PASSWORD_MAX_LENGTH {
        Err(errors::PasswordPolicyError::TooLong)
    } else {
        Ok(())
    }
}

/// Create a new user account.
pub async fn register(
    email: &str,
    phone: Option<String>,
    password: &str,
    db_conn: &db::ConnectionPool,
) -> Result<AppUser, errors::RegistrationError> {
    let email = EmailAddress::try_from(email)?;
    check_password_policy(password)?;
    if AppUser::select_by_email(&email, db_conn).await?.is_some() {
        return Err(errors::RegistrationError::EmailTaken(email.into()));
    }
    let phone = phone.filter(|phone| !phone.trim().is_empty());
    let hashed = HashedPassword::new_blocking(password).await?;
    let insert = AppUserInsert::new(email.clone(), phone, hashed);
    match insert.store(db_conn).await {
        Ok(user) => Ok(user),
        Err(err) if err.is_unique_violation() => {
            Err(errors::RegistrationError::EmailTaken(email.into()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Check an email and password pair and return the matching user.
pub async fn login(
    email: &str,
    password: &str,
    db_conn: &db::ConnectionPool,
) -> Result<AppUser, errors::LoginError> {
    let Ok(email) = EmailAddress::try_from(email) else {
        return Err(errors::LoginError::InvalidCredentials);
    };
    let user = AppUser::select_by_email(&email, db_conn)
        .await?
        .ok_or(errors::LoginError::InvalidCredentials)?;
    if user.verify_password(password).await? {
        Ok(user)
    } else {
        Err(errors::LoginError::InvalidCredentials)
    }
}

/// Look up the user behind an authenticated request.
pub async fn current_user(
    user_id: Uuid,
    db_conn: &db::ConnectionPool,
) -> Result<Option<AppUser>, db::errors::DatabaseError> {
    AppUser::select_one(user_id, db_conn).await
}

pub mod errors {
    use thiserror::Error;

    use crate::{
        constants::passwords::{PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH},
        db::errors::DatabaseError,
        utils::email::InvalidEmailAddress,
    };

    #[derive(Error, Debug)]
    pub enum PasswordPolicyError {
        #[error("Password must be at least {} characters", PASSWORD_MIN_LENGTH)]
        TooShort,
        #[error("Password must be at most {} characters", PASSWORD_MAX_LENGTH)]
        TooLong,
    }

    #[derive(Error, Debug)]
    pub enum RegistrationError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error(transparent)]
        InvalidEmail(#[from] InvalidEmailAddress),
        #[error(transparent)]
        PasswordPolicy(#[from] PasswordPolicyError),
        #[error("Email already registered")]
        EmailTaken(String),
        #[error("Password hashing task failed: {0}")]
        Hashing(#[from] tokio::task::JoinError),
    }

    #[derive(Error, Debug)]
    pub enum LoginError {
        #[error(transparent)]
        DatabaseError(#[from] DatabaseError),
        #[error("Invalid email or password")]
        InvalidCredentials,
        #[error("Password hashing task failed: {0}")]
        Hashing(#[from] tokio::task::JoinError),
    }
}

#[cfg(test)]
mod tests {
    use super::{check_password_policy, errors::PasswordPolicyError, Claims, JwtKeys};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    #[test]
    fn password_policy_bounds() {
        assert!(matches!(
            check_password_policy("short"),
            Err(PasswordPolicyError::TooShort)
        ));
        assert!(check_password_policy("exactly8").is_ok());
        assert!(matches!(
            check_password_policy(&"x".repeat(129)),
            Err(PasswordPolicyError::TooLong)
        ));
    }

    fn sign(secret: &str, exp: i64) -> String {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@example.com".to_owned(),
            iat: 0,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn rejects_expired_and_foreign_tokens() {
        let keys = JwtKeys::new("secret", 1);
        let future = time::OffsetDateTime::now_utc().unix_timestamp() + 3600;
        assert!(keys.verify(&sign("secret", future)).is_ok());
        assert!(keys.verify(&sign("secret", 1)).is_err());
        assert!(keys.verify(&sign("other", future)).is_err());
        assert!(keys.verify("not-a-jwt").is_err());
    }
}
