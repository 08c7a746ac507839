//! Driven port for signing and verifying bearer tokens.

use crate::domain::{AuthToken, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenIssuerError {
        /// A token could not be produced.
        Signing { message: String } => "token signing failed: {message}",
        /// The presented token is malformed or carries a bad signature.
        Invalid { message: String } => "token rejected: {message}",
        /// The presented token is past its expiry.
        Expired => "token expired",
    }
}

/// Claims carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Issue and verify signed bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Sign a token for `user`.
    fn issue(&self, user: &User) -> Result<AuthToken, TokenIssuerError>;

    /// Verify signature and expiry, returning the embedded claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, TokenIssuerError>;
}
