//! Driving port for account lifecycle use-cases.
//!
//! Inbound adapters call this port to register, sign in, edit or remove an
//! account without importing persistence or crypto details.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AuthSession, AuthToken, Caller, EmailAddress, Error, LoginCredentials, ProfileUpdate,
    Registration, User, UserId, UserValidationError, Username,
};

/// Domain use-case port for account changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityCommand: Send + Sync {
    /// Create an account and sign it in.
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error>;

    /// Exchange credentials for a fresh token.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;

    /// Change the caller's username and/or email.
    async fn update_profile(&self, caller: &Caller, update: ProfileUpdate) -> Result<User, Error>;

    /// Delete the caller together with every group and recipe they own.
    async fn delete_account(&self, caller: &Caller) -> Result<(), Error>;
}

pub(crate) const FIXTURE_USER_ID: UserId = UserId::from_uuid(uuid::Uuid::from_u128(
    0x123e_4567_e89b_12d3_a456_4266_1417_4000,
));
pub(crate) const FIXTURE_TOKEN: &str = "fixture-token";

/// Deterministic user returned by fixture ports.
pub(crate) fn fixture_user() -> Result<User, Error> {
    let invalid = |err: UserValidationError| Error::internal(format!("invalid fixture user: {err}"));
    Ok(User {
        id: FIXTURE_USER_ID,
        username: Username::new("admin").map_err(invalid)?,
        email: EmailAddress::new("admin@example.com").map_err(invalid)?,
        created_at: DateTime::<Utc>::default(),
    })
}

/// Fixture account service used until persistence is wired.
///
/// `admin@example.com` / `password` signs in; everything else is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityCommand;

#[async_trait]
impl IdentityCommand for FixtureIdentityCommand {
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        let user = User {
            id: UserId::random(),
            username: registration.username().clone(),
            email: registration.email().clone(),
            created_at: Utc::now(),
        };
        Ok(AuthSession {
            token: AuthToken::new(FIXTURE_TOKEN),
            user,
        })
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        if credentials.email() == "admin@example.com" && credentials.password().expose() == "password"
        {
            Ok(AuthSession {
                token: AuthToken::new(FIXTURE_TOKEN),
                user: fixture_user()?,
            })
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }

    async fn update_profile(&self, caller: &Caller, update: ProfileUpdate) -> Result<User, Error> {
        caller.require_user()?;
        let mut user = fixture_user()?;
        if let Some(username) = update.username {
            user.username = username;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        Ok(user)
    }

    async fn delete_account(&self, caller: &Caller) -> Result<(), Error> {
        caller.require_user().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("admin@example.com", "password", true)]
    #[case("admin@example.com", "wrong", false)]
    #[case("other@example.com", "password", false)]
    #[tokio::test]
    async fn fixture_login_accepts_only_the_admin_account(
        #[case] email: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let creds = LoginCredentials::try_from_parts(email, password).expect("credentials shape");
        let result = FixtureIdentityCommand.login(creds).await;
        match (should_succeed, result) {
            (true, Ok(session)) => assert_eq!(session.user.id, FIXTURE_USER_ID),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(session)) => panic!("expected failure, got {session:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_profile_update_requires_a_caller() {
        let err = FixtureIdentityCommand
            .update_profile(&Caller::Anonymous, ProfileUpdate::default())
            .await
            .expect_err("anonymous caller");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
