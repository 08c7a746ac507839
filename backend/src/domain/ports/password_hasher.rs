//! Driven port for one-way password hashing.

use async_trait::async_trait;

use crate::domain::Password;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Producing a new hash failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Hash and verify user passwords.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted hash suitable for storage.
    async fn hash(&self, password: &Password) -> Result<String, PasswordHasherError>;

    /// Check `password` against `stored`.
    ///
    /// `None` verifies against an internal dummy hash and always returns
    /// `false`, so unknown accounts cost the same as wrong passwords.
    async fn verify(
        &self,
        password: &Password,
        stored: Option<String>,
    ) -> Result<bool, PasswordHasherError>;
}
