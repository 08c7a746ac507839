//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    FixtureGroupCommand, FixtureGroupQuery, FixtureIdentityCommand, FixtureIdentityQuery,
    FixtureRecipeCommand, FixtureRecipeQuery, GroupCommand, GroupQuery, IdentityCommand,
    IdentityQuery, PasswordHasher, RecipeBookStore, RecipeCommand, RecipeQuery, TokenIssuer,
};
use crate::domain::{ConsistencyService, GroupService, IdentityService, RecipeQueryService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityCommand>,
    pub identity_query: Arc<dyn IdentityQuery>,
    pub groups: Arc<dyn GroupCommand>,
    pub groups_query: Arc<dyn GroupQuery>,
    pub recipes: Arc<dyn RecipeCommand>,
    pub recipes_query: Arc<dyn RecipeQuery>,
}

impl HttpState {
    /// State wired to the fixture ports, with no storage behind it.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::fixtures();
    /// let _recipes = state.recipes_query.clone();
    /// ```
    pub fn fixtures() -> Self {
        Self {
            identity: Arc::new(FixtureIdentityCommand),
            identity_query: Arc::new(FixtureIdentityQuery),
            groups: Arc::new(FixtureGroupCommand),
            groups_query: Arc::new(FixtureGroupQuery),
            recipes: Arc::new(FixtureRecipeCommand),
            recipes_query: Arc::new(FixtureRecipeQuery),
        }
    }

    /// Wire every port to the domain services over one shared store.
    ///
    /// The identity and group services delegate their cascades to the same
    /// [`ConsistencyService`] that handles recipe writes.
    pub fn from_store<S, H, T>(
        store: Arc<S>,
        hasher: Arc<H>,
        tokens: Arc<T>,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        S: RecipeBookStore + 'static,
        H: PasswordHasher + 'static,
        T: TokenIssuer + 'static,
    {
        let consistency = Arc::new(ConsistencyService::new(store.clone(), clock.clone()));
        let identity = Arc::new(IdentityService::new(
            store.clone(),
            hasher,
            tokens,
            consistency.clone(),
            clock.clone(),
        ));
        let groups = Arc::new(GroupService::new(store.clone(), consistency.clone(), clock));
        Self {
            identity: identity.clone(),
            identity_query: identity,
            groups: groups.clone(),
            groups_query: groups,
            recipes: consistency,
            recipes_query: Arc::new(RecipeQueryService::new(store)),
        }
    }
}
