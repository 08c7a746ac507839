//! Driving port for recipe reads. Anonymous callers are allowed.

use async_trait::async_trait;

use crate::domain::{Caller, Error, RecipeAggregate, RecipeId};

/// Listing options accepted by [`RecipeQuery::list_recipes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeListRequest {
    /// Only the caller's own recipes. Ignored for anonymous callers.
    pub mine: bool,
    /// Case-insensitive title substring.
    pub search: Option<String>,
}

/// Domain use-case port for recipe reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeQuery: Send + Sync {
    async fn get_recipe(&self, id: &RecipeId) -> Result<RecipeAggregate, Error>;

    /// Aggregates ordered by title ascending.
    async fn list_recipes(
        &self,
        caller: &Caller,
        request: RecipeListRequest,
    ) -> Result<Vec<RecipeAggregate>, Error>;
}

/// Fixture with no recipes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRecipeQuery;

#[async_trait]
impl RecipeQuery for FixtureRecipeQuery {
    async fn get_recipe(&self, _id: &RecipeId) -> Result<RecipeAggregate, Error> {
        Err(Error::entity_not_found("recipe"))
    }

    async fn list_recipes(
        &self,
        _caller: &Caller,
        _request: RecipeListRequest,
    ) -> Result<Vec<RecipeAggregate>, Error> {
        Ok(Vec::new())
    }
}
