//! Tests for the account service.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockPasswordHasher, MockTokenIssuer, TokenClaims};
use crate::domain::{AuthToken, ErrorCode};
use crate::outbound::memory::InMemoryRecipeBookStore;

type Service = IdentityService<InMemoryRecipeBookStore, MockPasswordHasher, MockTokenIssuer>;

/// Hasher double that prefixes the plaintext, so verification is exact.
fn plain_hasher() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|password| Ok(format!("hashed:{}", password.expose())));
    hasher.expect_verify().returning(|password, stored| {
        Ok(stored.is_some_and(|hash| hash == format!("hashed:{}", password.expose())))
    });
    hasher
}

fn echo_tokens() -> MockTokenIssuer {
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_issue()
        .returning(|user| Ok(AuthToken::new(format!("token-for-{}", user.id))));
    tokens
}

fn service_with(hasher: MockPasswordHasher, tokens: MockTokenIssuer) -> Service {
    let store = Arc::new(InMemoryRecipeBookStore::new());
    let consistency = Arc::new(ConsistencyService::new(
        Arc::clone(&store),
        Arc::new(DefaultClock),
    ));
    IdentityService::new(
        store,
        Arc::new(hasher),
        Arc::new(tokens),
        consistency,
        Arc::new(DefaultClock),
    )
}

fn registration(username: &str, email: &str) -> Registration {
    Registration::try_from_parts(username, email, "secret1").expect("valid registration")
}

#[rstest]
#[tokio::test]
async fn register_then_login_round_trip() {
    let service = service_with(plain_hasher(), echo_tokens());
    let session = service
        .register(registration("ana", "ana@example.com"))
        .await
        .expect("registered");
    assert_eq!(session.token.as_str(), format!("token-for-{}", session.user.id));

    let login = service
        .login(LoginCredentials::try_from_parts("ana@example.com", "secret1").expect("shape"))
        .await
        .expect("login");
    assert_eq!(login.user, session.user);
}

#[rstest]
#[case("ana@example.com", "wrong-password")]
#[case("nobody@example.com", "secret1")]
#[tokio::test]
async fn bad_credentials_share_one_error(#[case] email: &str, #[case] password: &str) {
    let service = service_with(plain_hasher(), echo_tokens());
    service
        .register(registration("ana", "ana@example.com"))
        .await
        .expect("registered");

    let err = service
        .login(LoginCredentials::try_from_parts(email, password).expect("shape"))
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "invalid credentials");
}

#[rstest]
#[case("ana", "other@example.com", "username")]
#[case("other", "ana@example.com", "email")]
#[case("ana", "ana@example.com", "email")]
#[tokio::test]
async fn registration_conflicts_name_the_field(
    #[case] username: &str,
    #[case] email: &str,
    #[case] field: &str,
) {
    let service = service_with(plain_hasher(), echo_tokens());
    service
        .register(registration("ana", "ana@example.com"))
        .await
        .expect("registered");

    let err = service
        .register(registration(username, email))
        .await
        .expect_err("conflict");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(
        err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
        Some(field)
    );
}

#[rstest]
#[tokio::test]
async fn profile_update_prefers_reporting_username() {
    let service = service_with(plain_hasher(), echo_tokens());
    service
        .register(registration("ana", "ana@example.com"))
        .await
        .expect("ana");
    let bea = service
        .register(registration("bea", "bea@example.com"))
        .await
        .expect("bea");
    let caller = Caller::Authenticated(bea.user.id);

    let update = ProfileUpdate::try_from_parts(Some("ana"), Some("ana@example.com"))
        .expect("valid update");
    let err = service
        .update_profile(&caller, update)
        .await
        .expect_err("conflict");
    assert_eq!(
        err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
        Some("username")
    );

    let own = ProfileUpdate::try_from_parts(Some("bea"), Some("b@example.com")).expect("valid");
    let updated = service.update_profile(&caller, own).await.expect("update");
    assert_eq!(updated.email.as_ref(), "b@example.com");
    assert_eq!(service.profile(&caller).await.expect("profile"), updated);
}

#[rstest]
#[tokio::test]
async fn deleted_account_has_no_profile() {
    let service = service_with(plain_hasher(), echo_tokens());
    let session = service
        .register(registration("ana", "ana@example.com"))
        .await
        .expect("registered");
    let caller = Caller::Authenticated(session.user.id);

    service.delete_account(&caller).await.expect("deleted");

    let err = service.profile(&caller).await.expect_err("gone");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn hashing_failure_is_internal_and_stores_nothing() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .return_once(|_| Err(PasswordHasherError::hash("out of memory")));
    hasher.expect_verify().returning(|_, _| Ok(false));
    let service = service_with(hasher, echo_tokens());

    let err = service
        .register(registration("ana", "ana@example.com"))
        .await
        .expect_err("hash failure");
    assert_eq!(err.code(), ErrorCode::InternalError);

    let login = service
        .login(LoginCredentials::try_from_parts("ana@example.com", "secret1").expect("shape"))
        .await
        .expect_err("no account");
    assert_eq!(login.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[case(TokenIssuerError::invalid("bad signature"), "invalid token")]
#[case(TokenIssuerError::expired(), "token expired")]
#[tokio::test]
async fn rejected_tokens_are_unauthorized(#[case] failure: TokenIssuerError, #[case] message: &str) {
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_verify().return_once(move |_| Err(failure));
    let service = service_with(plain_hasher(), tokens);

    let err = service.resolve_caller("whatever").await.expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), message);
}

#[rstest]
#[tokio::test]
async fn verified_token_resolves_to_its_user() {
    let id = UserId::random();
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_verify().return_once(move |_| {
        Ok(TokenClaims {
            user_id: id,
            username: "ana".to_owned(),
            email: "ana@example.com".to_owned(),
            issued_at: 0,
            expires_at: 1,
        })
    });
    let service = service_with(plain_hasher(), tokens);

    let caller = service.resolve_caller("signed").await.expect("verified");
    assert_eq!(caller, Caller::Authenticated(id));
}
