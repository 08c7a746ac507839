//! Builders turning a [`ServerConfig`] into handler state.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use recipe_backend::inbound::http::state::HttpState;
use recipe_backend::outbound::memory::InMemoryRecipeBookStore;
use recipe_backend::outbound::persistence::DieselRecipeBookStore;
use recipe_backend::outbound::security::{Argon2PasswordHasher, HmacTokenIssuer};

use super::config::{ServerConfig, StorageBackend};

/// Build the shared HTTP state for the configured storage backend.
///
/// # Errors
///
/// Returns [`io::Error`] when the password hasher or token issuer cannot
/// be initialised.
pub(super) fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hasher = Arc::new(
        Argon2PasswordHasher::new()
            .map_err(|err| io::Error::other(format!("password hasher setup failed: {err}")))?,
    );
    let tokens = HmacTokenIssuer::new(config.token_key.to_vec(), clock.clone())
        .map_err(|err| io::Error::other(format!("token issuer setup failed: {err}")))?;
    info!(key_fingerprint = %tokens.fingerprint(), "token signing key loaded");
    let tokens = Arc::new(tokens);

    let state = match &config.storage {
        StorageBackend::Postgres(pool) => {
            let store = Arc::new(DieselRecipeBookStore::new(pool.clone()));
            HttpState::from_store(store, hasher, tokens, clock)
        }
        StorageBackend::Memory => {
            warn!("no database configured; recipe book data is kept in memory");
            let store = Arc::new(InMemoryRecipeBookStore::new());
            HttpState::from_store(store, hasher, tokens, clock)
        }
    };
    Ok(web::Data::new(state))
}
