//! Driving port for recipe writes and group membership changes.

use async_trait::async_trait;

use crate::domain::{Caller, Error, GroupId, RecipeAggregate, RecipeId, RecipeInput, RecipePatchInput};

/// Domain use-case port for recipe changes.
///
/// Inputs arrive unvalidated because title uniqueness is checked between
/// field validation steps and needs the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeCommand: Send + Sync {
    async fn create_recipe(
        &self,
        caller: &Caller,
        input: RecipeInput,
    ) -> Result<RecipeAggregate, Error>;

    async fn update_recipe(
        &self,
        caller: &Caller,
        id: &RecipeId,
        input: RecipePatchInput,
    ) -> Result<RecipeAggregate, Error>;

    async fn delete_recipe(&self, caller: &Caller, id: &RecipeId) -> Result<(), Error>;

    /// Link the recipe to every listed group the caller owns. Returns how
    /// many owned groups were resolved.
    async fn attach_to_groups(
        &self,
        caller: &Caller,
        id: &RecipeId,
        group_ids: Vec<GroupId>,
    ) -> Result<u64, Error>;

    async fn detach_from_group(
        &self,
        caller: &Caller,
        id: &RecipeId,
        group_id: &GroupId,
    ) -> Result<(), Error>;
}

/// Fixture recipe commands: every recipe is missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRecipeCommand;

#[async_trait]
impl RecipeCommand for FixtureRecipeCommand {
    async fn create_recipe(
        &self,
        caller: &Caller,
        _input: RecipeInput,
    ) -> Result<RecipeAggregate, Error> {
        caller.require_user()?;
        Err(Error::service_unavailable("recipe storage is not configured"))
    }

    async fn update_recipe(
        &self,
        caller: &Caller,
        _id: &RecipeId,
        _input: RecipePatchInput,
    ) -> Result<RecipeAggregate, Error> {
        caller.require_user()?;
        Err(Error::entity_not_found("recipe"))
    }

    async fn delete_recipe(&self, caller: &Caller, _id: &RecipeId) -> Result<(), Error> {
        caller.require_user()?;
        Err(Error::entity_not_found("recipe"))
    }

    async fn attach_to_groups(
        &self,
        caller: &Caller,
        _id: &RecipeId,
        _group_ids: Vec<GroupId>,
    ) -> Result<u64, Error> {
        caller.require_user()?;
        Err(Error::entity_not_found("recipe"))
    }

    async fn detach_from_group(
        &self,
        caller: &Caller,
        _id: &RecipeId,
        _group_id: &GroupId,
    ) -> Result<(), Error> {
        caller.require_user()?;
        Err(Error::entity_not_found("recipe"))
    }
}
