//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::http::header::AUTHORIZATION;
use actix_web::test::TestRequest;

use crate::domain::ports::{
    FIXTURE_TOKEN, MockGroupCommand, MockGroupQuery, MockIdentityCommand, MockIdentityQuery,
    MockRecipeCommand, MockRecipeQuery,
};

use super::state::HttpState;

/// State backed entirely by fixture ports.
pub fn fixture_state() -> HttpState {
    HttpState::fixtures()
}

pub fn state_with_identity(identity: MockIdentityCommand) -> HttpState {
    HttpState {
        identity: Arc::new(identity),
        ..fixture_state()
    }
}

pub fn state_with_identity_query(identity_query: MockIdentityQuery) -> HttpState {
    HttpState {
        identity_query: Arc::new(identity_query),
        ..fixture_state()
    }
}

pub fn state_with_groups(groups: MockGroupCommand) -> HttpState {
    HttpState {
        groups: Arc::new(groups),
        ..fixture_state()
    }
}

pub fn state_with_groups_query(groups_query: MockGroupQuery) -> HttpState {
    HttpState {
        groups_query: Arc::new(groups_query),
        ..fixture_state()
    }
}

pub fn state_with_recipes(recipes: MockRecipeCommand) -> HttpState {
    HttpState {
        recipes: Arc::new(recipes),
        ..fixture_state()
    }
}

pub fn state_with_recipes_query(recipes_query: MockRecipeQuery) -> HttpState {
    HttpState {
        recipes_query: Arc::new(recipes_query),
        ..fixture_state()
    }
}

/// Attach the fixture bearer token accepted by `FixtureIdentityQuery`.
pub fn signed_in(request: TestRequest) -> TestRequest {
    request.insert_header((AUTHORIZATION, format!("Bearer {FIXTURE_TOKEN}")))
}
