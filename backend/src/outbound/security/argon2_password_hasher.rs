//! Argon2id password hashing.
//!
//! Hashes are PHC strings with a random per-password salt. Both operations run
//! on the blocking thread pool because Argon2 is deliberately slow.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use rand::rngs::OsRng;

use crate::domain::Password;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-accounts";

fn hash_blocking(password: &str) -> Result<String, PasswordHasherError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHasherError::hash(err.to_string()))
}

fn verify_blocking(password: &str, stored: &str) -> Result<bool, PasswordHasherError> {
    let parsed =
        PasswordHash::new(stored).map_err(|err| PasswordHasherError::malformed_hash(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordHasherError::malformed_hash(err.to_string())),
    }
}

async fn on_blocking_pool<T, F>(work: F) -> Result<T, PasswordHasherError>
where
    F: FnOnce() -> Result<T, PasswordHasherError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| PasswordHasherError::hash(format!("hashing task failed: {err}")))?
}

/// [`PasswordHasher`] backed by Argon2id with default parameters.
///
/// Holds a hash of a fixed dummy password so that verifying a login for an
/// unknown e-mail costs the same as a wrong password.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    dummy_hash: String,
}

impl Argon2PasswordHasher {
    /// Build the hasher, computing the dummy hash up front.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHasherError::Hash`] when Argon2 cannot hash.
    pub fn new() -> Result<Self, PasswordHasherError> {
        Ok(Self {
            dummy_hash: hash_blocking(DUMMY_PASSWORD)?,
        })
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &Password) -> Result<String, PasswordHasherError> {
        let password = password.clone();
        on_blocking_pool(move || hash_blocking(password.expose())).await
    }

    async fn verify(
        &self,
        password: &Password,
        stored: Option<String>,
    ) -> Result<bool, PasswordHasherError> {
        let password = password.clone();
        let known = stored.is_some();
        let hash = stored.unwrap_or_else(|| self.dummy_hash.clone());
        let matched = on_blocking_pool(move || verify_blocking(password.expose(), &hash)).await?;
        Ok(known && matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new().expect("argon2 available")
    }

    #[rstest]
    #[tokio::test]
    async fn hashes_are_salted_phc_strings(hasher: Argon2PasswordHasher) {
        let password = Password::new("secret1");
        let first = hasher.hash(&password).await.expect("hash");
        let second = hasher.hash(&password).await.expect("hash");

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
    }

    #[rstest]
    #[case("secret1", true)]
    #[case("secret2", false)]
    #[tokio::test]
    async fn verifies_against_stored_hash(
        hasher: Argon2PasswordHasher,
        #[case] attempt: &str,
        #[case] expected: bool,
    ) {
        let stored = hasher.hash(&Password::new("secret1")).await.expect("hash");

        let verified = hasher
            .verify(&Password::new(attempt), Some(stored))
            .await
            .expect("verify");
        assert_eq!(verified, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_account_never_verifies(hasher: Argon2PasswordHasher) {
        let verified = hasher
            .verify(&Password::new(DUMMY_PASSWORD), None)
            .await
            .expect("verify");
        assert!(!verified);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_stored_hash_is_reported(hasher: Argon2PasswordHasher) {
        let err = hasher
            .verify(&Password::new("secret1"), Some("plaintext".to_owned()))
            .await
            .expect_err("malformed");
        assert!(matches!(err, PasswordHasherError::MalformedHash { .. }));
    }
}
