//! Credential adapters: password hashing and bearer token signing.

mod argon2_password_hasher;
mod hmac_token_issuer;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use hmac_token_issuer::{GENERATED_KEY_LEN, HmacTokenIssuer};
