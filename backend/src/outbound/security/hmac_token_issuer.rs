//! HS256 JSON Web Tokens signed with a shared secret.
//!
//! Tokens carry `{id, username, email, iat, exp}` and are valid for seven
//! days by default. Expiry is judged by the injected clock rather than the
//! system time so it can be exercised in tests.

use std::sync::Arc;

use chrono::TimeDelta;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{TokenClaims, TokenIssuer, TokenIssuerError};
use crate::domain::{AuthToken, User, UserId};

/// Length of keys produced by [`HmacTokenIssuer::generate_key`].
pub const GENERATED_KEY_LEN: usize = 32;

/// Bytes of the key digest shown by [`HmacTokenIssuer::fingerprint`].
const FINGERPRINT_LEN: usize = 8;

#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    id: String,
    username: String,
    email: String,
    iat: i64,
    exp: i64,
}

fn map_decode_error(err: &JwtError) -> TokenIssuerError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenIssuerError::expired(),
        ErrorKind::InvalidSignature => {
            debug!("token signature mismatch");
            TokenIssuerError::invalid("signature mismatch")
        }
        _ => TokenIssuerError::invalid(err.to_string()),
    }
}

/// [`TokenIssuer`] producing HS256 JWTs.
pub struct HmacTokenIssuer {
    key: Zeroizing<Vec<u8>>,
    clock: Arc<dyn Clock>,
    validity: TimeDelta,
}

impl HmacTokenIssuer {
    /// Build an issuer from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TokenIssuerError::Signing`] for an empty key.
    pub fn new(key: impl Into<Vec<u8>>, clock: Arc<dyn Clock>) -> Result<Self, TokenIssuerError> {
        let key = Zeroizing::new(key.into());
        if key.is_empty() {
            return Err(TokenIssuerError::signing("token key must not be empty"));
        }
        Ok(Self {
            key,
            clock,
            validity: TimeDelta::days(7),
        })
    }

    /// Override the default seven-day validity.
    pub fn with_validity(mut self, validity: TimeDelta) -> Self {
        self.validity = validity;
        self
    }

    /// Random key for development when no key file is configured.
    pub fn generate_key() -> Vec<u8> {
        let mut key = vec![0_u8; GENERATED_KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut key);
        key
    }

    /// Short, non-reversible key identifier safe to log.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.key.as_slice());
        hex::encode(digest.get(..FINGERPRINT_LEN).unwrap_or_default())
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation
    }
}

impl TokenIssuer for HmacTokenIssuer {
    fn issue(&self, user: &User) -> Result<AuthToken, TokenIssuerError> {
        let issued_at = self.clock.utc().timestamp();
        let claims = WireClaims {
            id: user.id.to_string(),
            username: user.username.to_string(),
            email: user.email.to_string(),
            iat: issued_at,
            exp: issued_at + self.validity.num_seconds(),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.key),
        )
        .map(AuthToken::new)
        .map_err(|err| TokenIssuerError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenIssuerError> {
        let claims = jsonwebtoken::decode::<WireClaims>(
            token,
            &DecodingKey::from_secret(&self.key),
            &Self::validation(),
        )
        .map_err(|err| map_decode_error(&err))?
        .claims;
        if self.clock.utc().timestamp() >= claims.exp {
            return Err(TokenIssuerError::expired());
        }
        let user_id = UserId::new(&claims.id)
            .map_err(|err| TokenIssuerError::invalid(format!("bad subject: {err}")))?;

        Ok(TokenClaims {
            user_id,
            username: claims.username,
            email: claims.email,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}
