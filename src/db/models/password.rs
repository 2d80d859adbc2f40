//! Argon2id hashing of password credentials stored on the users table.
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use tokio::task::{spawn_blocking, JoinError};

/// Instantiate an Argon2 context with the standard parameters.
fn create_argon2<'a>() -> Argon2<'a> {
    Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(12288, 3, 1, None).expect("Invalid Argon2id parameters"),
    )
}

/// A PHC-format Argon2id hash of a password.
#[derive(Clone)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Hash a raw password string with a fresh salt.
    pub fn new(password: &str) -> Self {
        let salt = SaltString::generate(&mut OsRng);
        let hash = create_argon2()
            .hash_password(password.as_bytes(), &salt)
            .expect("Argon2id error while hashing password");
        Self(hash.to_string())
    }

    /// Hash a password on the blocking thread pool.
    pub async fn new_blocking(password: &str) -> Result<Self, JoinError> {
        let password = password.to_owned();
        spawn_blocking(move || Self::new(&password)).await
    }

    /// Wrap a hash read back from the database.
    pub const fn from_stored(hash: String) -> Self {
        Self(hash)
    }

    /// Verify that a plaintext password matches this hash. A malformed stored
    /// hash never matches.
    pub fn verify(&self, password: &str) -> bool {
        let Ok(hash) = PasswordHash::new(&self.0) else {
            tracing::error!("malformed Argon2id hash read from the database");
            return false;
        };
        create_argon2()
            .verify_password(password.as_bytes(), &hash)
            .is_ok()
    }

    /// `verify` on the blocking thread pool.
    pub async fn verify_blocking(self, password: &str) -> Result<bool, JoinError> {
        let password = password.to_owned();
        spawn_blocking(move || self.verify(&password)).await
    }

    /// The encoded hash, as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::HashedPassword;

    #[test]
    fn verifies_only_the_hashed_password() {
        let hash = HashedPassword::new("correct horse battery");
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hash.verify("correct horse battery"));
        assert!(!hash.verify("wrong password"));
    }

    #[tokio::test]
    async fn blocking_variants_agree() {
        let hash = HashedPassword::new_blocking("correct horse battery")
            .await
            .unwrap();
        assert!(hash.clone().verify_blocking("correct horse battery").await.unwrap());
        assert!(!hash.verify_blocking("wrong password").await.unwrap());
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!HashedPassword::from_stored("not a hash".to_owned()).verify("anything"));
    }
}
