//! Driving port for identity reads: the caller's profile and bearer token
//! resolution.

use async_trait::async_trait;

use crate::domain::{Caller, Error, User};

use super::identity_command::{FIXTURE_TOKEN, FIXTURE_USER_ID, fixture_user};

/// Domain use-case port for reading identities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityQuery: Send + Sync {
    /// Return the authenticated caller's profile.
    async fn profile(&self, caller: &Caller) -> Result<User, Error>;

    /// Turn a bearer token into a caller, or fail with `Unauthorized`.
    async fn resolve_caller(&self, token: &str) -> Result<Caller, Error>;
}

/// Fixture identity reads matching [`super::FixtureIdentityCommand`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityQuery;

#[async_trait]
impl IdentityQuery for FixtureIdentityQuery {
    async fn profile(&self, caller: &Caller) -> Result<User, Error> {
        caller.require_user()?;
        fixture_user()
    }

    async fn resolve_caller(&self, token: &str) -> Result<Caller, Error> {
        if token == FIXTURE_TOKEN {
            Ok(Caller::Authenticated(FIXTURE_USER_ID))
        } else {
            Err(Error::unauthorized("invalid token"))
        }
    }
}
