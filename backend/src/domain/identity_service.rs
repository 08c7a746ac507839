//! Account services: registration, sign-in, profile edits and removal.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::consistency::ConsistencyService;
use crate::domain::ports::{
    IdentityCollision, IdentityCommand, IdentityQuery, IdentityStore, PasswordHasher,
    PasswordHasherError, RecipeBookStore, RecipeBookTransaction, TokenIssuer, TokenIssuerError,
};
use crate::domain::transaction::{begin, finish, map_store_error};
use crate::domain::{
    AuthSession, Caller, Error, LoginCredentials, ProfileUpdate, Registration, User, UserId,
};

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

fn map_token_error(error: TokenIssuerError) -> Error {
    match error {
        TokenIssuerError::Signing { message } => {
            Error::internal(format!("token signing failed: {message}"))
        }
        TokenIssuerError::Invalid { .. } => Error::unauthorized("invalid token"),
        TokenIssuerError::Expired => Error::unauthorized("token expired"),
    }
}

/// Registration reports email first; profile edits report username first.
fn collision_field(collision: IdentityCollision, prefer_username: bool) -> &'static str {
    match (collision.username, collision.email) {
        (true, true) if prefer_username => "username",
        (true, true) => "email",
        (true, false) => "username",
        _ => "email",
    }
}

async fn load_user(tx: &mut dyn RecipeBookTransaction, id: &UserId) -> Result<User, Error> {
    tx.find_user(id)
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| Error::entity_not_found("user"))
}

/// Identity service implementing the account driving ports.
pub struct IdentityService<S, H, T> {
    store: Arc<S>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    consistency: Arc<ConsistencyService<S>>,
    clock: Arc<dyn Clock>,
}

impl<S, H, T> IdentityService<S, H, T> {
    pub fn new(
        store: Arc<S>,
        hasher: Arc<H>,
        tokens: Arc<T>,
        consistency: Arc<ConsistencyService<S>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            consistency,
            clock,
        }
    }
}

impl<S, H, T> IdentityService<S, H, T>
where
    S: RecipeBookStore,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn register_in(
        &self,
        tx: &mut dyn RecipeBookTransaction,
        registration: &Registration,
        password_hash: &str,
    ) -> Result<AuthSession, Error> {
        let collision = tx
            .find_identity_collision(
                Some(registration.username()),
                Some(registration.email()),
                None,
            )
            .await
            .map_err(map_store_error)?;
        if let Some(collision) = collision {
            return Err(Error::field_conflict(collision_field(collision, false)));
        }

        let user = User {
            id: UserId::random(),
            username: registration.username().clone(),
            email: registration.email().clone(),
            created_at: self.clock.utc(),
        };
        tx.insert_user(&user, password_hash)
            .await
            .map_err(map_store_error)?;
        let token = self.tokens.issue(&user).map_err(map_token_error)?;
        Ok(AuthSession { token, user })
    }

    async fn update_in(
        tx: &mut dyn RecipeBookTransaction,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let mut user = load_user(tx, id).await?;
        if update.is_empty() {
            return Ok(user);
        }
        let collision = tx
            .find_identity_collision(update.username.as_ref(), update.email.as_ref(), Some(id))
            .await
            .map_err(map_store_error)?;
        if let Some(collision) = collision {
            return Err(Error::field_conflict(collision_field(collision, true)));
        }

        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        tx.update_user(&user).await.map_err(map_store_error)?;
        Ok(user)
    }
}

#[async_trait]
impl<S, H, T> IdentityCommand for IdentityService<S, H, T>
where
    S: RecipeBookStore,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        // Hash before opening the transaction so the slow part holds no lock.
        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hasher_error)?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = self
            .register_in(tx.as_mut(), &registration, &password_hash)
            .await;
        let session = finish(tx, outcome).await?;
        info!(user_id = %session.user.id, "account registered");
        Ok(session)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = tx
            .find_credentials(credentials.email())
            .await
            .map_err(map_store_error);
        let stored = finish(tx, outcome).await?;

        let verified = self
            .hasher
            .verify(
                credentials.password(),
                stored.as_ref().map(|found| found.password_hash.clone()),
            )
            .await
            .map_err(map_hasher_error)?;
        match stored {
            Some(found) if verified => {
                let token = self.tokens.issue(&found.user).map_err(map_token_error)?;
                Ok(AuthSession {
                    token,
                    user: found.user,
                })
            }
            _ => {
                debug!("login rejected");
                Err(Error::unauthorized("invalid credentials"))
            }
        }
    }

    async fn update_profile(&self, caller: &Caller, update: ProfileUpdate) -> Result<User, Error> {
        let id = caller.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = Self::update_in(tx.as_mut(), id, update).await;
        finish(tx, outcome).await
    }

    async fn delete_account(&self, caller: &Caller) -> Result<(), Error> {
        self.consistency.delete_user(caller).await
    }
}

#[async_trait]
impl<S, H, T> IdentityQuery for IdentityService<S, H, T>
where
    S: RecipeBookStore,
    H: PasswordHasher,
    T: TokenIssuer,
{
    async fn profile(&self, caller: &Caller) -> Result<User, Error> {
        let id = caller.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = load_user(tx.as_mut(), id).await;
        finish(tx, outcome).await
    }

    async fn resolve_caller(&self, token: &str) -> Result<Caller, Error> {
        let claims = self.tokens.verify(token).map_err(map_token_error)?;
        Ok(Caller::Authenticated(claims.user_id))
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
