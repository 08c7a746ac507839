//! Multi-entity recipe book transactions.
//!
//! [`ConsistencyService`] owns every use-case that writes more than one row:
//! recipe create/update/delete, group membership changes, the destructive
//! group delete and account removal. Each call opens one transaction,
//! checks authorization before its first write and either commits every
//! change or rolls all of them back.
//!
//! Cascades are spelled out rather than left to foreign keys. For a set of
//! recipes the order is links, steps, ingredients, recipe rows; groups follow
//! with their links and then their rows.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    GroupStore, IdentityStore, RecipeBookStore, RecipeBookTransaction, RecipeCommand, RecipeStore,
};
use crate::domain::transaction::{begin, finish, map_store_error};
use crate::domain::{
    Caller, Error, GroupDeletion, GroupId, Recipe, RecipeAggregate, RecipeDraft, RecipeId,
    RecipeInput, RecipePatch, RecipePatchInput, RecipeTitle, RecipeValidationError, UserId,
    position_ingredients, position_steps,
};

/// Transactional orchestration of recipes, groups and their links.
pub struct ConsistencyService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> ConsistencyService<S> {
    /// Create a service writing through `store` and stamping rows with `clock`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

/// Fail with `Unauthorized` when the caller's account no longer exists.
pub(crate) async fn ensure_account(
    tx: &mut dyn RecipeBookTransaction,
    user: &UserId,
) -> Result<(), Error> {
    match tx.find_user(user).await.map_err(map_store_error)? {
        Some(_) => Ok(()),
        None => Err(Error::unauthorized("account no longer exists")),
    }
}

async fn load_recipe(
    tx: &mut dyn RecipeBookTransaction,
    id: &RecipeId,
) -> Result<Recipe, Error> {
    tx.find_recipe(id)
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| Error::entity_not_found("recipe"))
}

async fn load_owned_recipe(
    tx: &mut dyn RecipeBookTransaction,
    id: &RecipeId,
    user: &UserId,
) -> Result<Recipe, Error> {
    let recipe = load_recipe(tx, id).await?;
    if !recipe.is_owned_by(user) {
        return Err(Error::forbidden("you do not own this recipe"));
    }
    Ok(recipe)
}

async fn load_aggregate(
    tx: &mut dyn RecipeBookTransaction,
    id: &RecipeId,
) -> Result<RecipeAggregate, Error> {
    tx.load_aggregate(id)
        .await
        .map_err(map_store_error)?
        .ok_or_else(|| Error::internal(format!("recipe {id} vanished mid-transaction")))
}

async fn ensure_title_free(
    tx: &mut dyn RecipeBookTransaction,
    title: &RecipeTitle,
    excluding: Option<&RecipeId>,
) -> Result<(), Error> {
    if tx
        .title_taken(title, excluding)
        .await
        .map_err(map_store_error)?
    {
        return Err(Error::field_conflict("title"));
    }
    Ok(())
}

/// Link `recipe` to the requested groups that `owner` owns. Returns how
/// many owned groups were resolved.
async fn link_owned_groups(
    tx: &mut dyn RecipeBookTransaction,
    recipe: &RecipeId,
    requested: &[GroupId],
    owner: &UserId,
) -> Result<u64, Error> {
    if requested.is_empty() {
        return Ok(0);
    }
    let owned: Vec<GroupId> = tx
        .find_owned_groups(requested, owner)
        .await
        .map_err(map_store_error)?
        .into_iter()
        .map(|group| group.id)
        .collect();
    if !owned.is_empty() {
        tx.link_groups(recipe, &owned)
            .await
            .map_err(map_store_error)?;
    }
    Ok(owned.len() as u64)
}

/// Remove recipes with every row that depends on them.
async fn purge_recipes(
    tx: &mut dyn RecipeBookTransaction,
    recipes: &[RecipeId],
) -> Result<(), Error> {
    if recipes.is_empty() {
        return Ok(());
    }
    tx.delete_recipe_links(recipes)
        .await
        .map_err(map_store_error)?;
    tx.delete_steps(recipes).await.map_err(map_store_error)?;
    tx.delete_ingredients(recipes)
        .await
        .map_err(map_store_error)?;
    tx.delete_recipes(recipes).await.map_err(map_store_error)?;
    Ok(())
}

/// Remove groups and their membership rows. Linked recipes survive.
async fn purge_groups(tx: &mut dyn RecipeBookTransaction, groups: &[GroupId]) -> Result<(), Error> {
    if groups.is_empty() {
        return Ok(());
    }
    tx.delete_group_links(groups)
        .await
        .map_err(map_store_error)?;
    tx.delete_groups(groups).await.map_err(map_store_error)?;
    Ok(())
}

impl<S> ConsistencyService<S>
where
    S: RecipeBookStore,
{
    async fn create_in(
        &self,
        tx: &mut dyn RecipeBookTransaction,
        owner: &UserId,
        draft: RecipeDraft,
    ) -> Result<RecipeAggregate, Error> {
        ensure_account(tx, owner).await?;
        let recipe = Recipe::from_draft(&draft, *owner, self.clock.utc());
        ensure_title_free(tx, &recipe.title, None).await?;

        tx.insert_recipe(&recipe).await.map_err(map_store_error)?;
        tx.insert_ingredients(&recipe.id, &position_ingredients(draft.ingredients))
            .await
            .map_err(map_store_error)?;
        tx.insert_steps(&recipe.id, &position_steps(draft.steps))
            .await
            .map_err(map_store_error)?;
        link_owned_groups(tx, &recipe.id, &draft.group_ids, owner).await?;

        load_aggregate(tx, &recipe.id).await
    }

    async fn update_in(
        &self,
        tx: &mut dyn RecipeBookTransaction,
        user: &UserId,
        id: &RecipeId,
        input: RecipePatchInput,
    ) -> Result<RecipeAggregate, Error> {
        let mut recipe = load_owned_recipe(tx, id, user).await?;
        // A clashing new title is reported before any other payload problem.
        let new_title = input
            .title
            .as_deref()
            .and_then(|raw| RecipeTitle::new(raw).ok())
            .filter(|title| *title != recipe.title);
        if let Some(title) = &new_title {
            ensure_title_free(tx, title, Some(id)).await?;
        }
        let patch = RecipePatch::try_from(input).map_err(|err| Error::invalid_field(&err))?;

        recipe.apply_fields(&patch, self.clock.utc());
        tx.update_recipe(&recipe).await.map_err(map_store_error)?;

        let RecipePatch {
            ingredients,
            steps,
            group_ids,
            ..
        } = patch;
        let recipe_ids = [*id];
        if let Some(ingredients) = ingredients {
            tx.delete_ingredients(&recipe_ids)
                .await
                .map_err(map_store_error)?;
            tx.insert_ingredients(id, &position_ingredients(ingredients))
                .await
                .map_err(map_store_error)?;
        }
        if let Some(steps) = steps {
            tx.delete_steps(&recipe_ids)
                .await
                .map_err(map_store_error)?;
            tx.insert_steps(id, &position_steps(steps))
                .await
                .map_err(map_store_error)?;
        }
        if let Some(group_ids) = group_ids {
            tx.delete_recipe_links(&recipe_ids)
                .await
                .map_err(map_store_error)?;
            link_owned_groups(tx, id, &group_ids, user).await?;
        }

        load_aggregate(tx, id).await
    }

    async fn delete_recipe_in(
        tx: &mut dyn RecipeBookTransaction,
        user: &UserId,
        id: &RecipeId,
    ) -> Result<(), Error> {
        load_owned_recipe(tx, id, user).await?;
        purge_recipes(tx, &[*id]).await
    }

    async fn attach_in(
        tx: &mut dyn RecipeBookTransaction,
        user: &UserId,
        id: &RecipeId,
        group_ids: &[GroupId],
    ) -> Result<u64, Error> {
        load_owned_recipe(tx, id, user).await?;
        if group_ids.is_empty() {
            return Err(Error::invalid_field(&RecipeValidationError::MissingGroupIds));
        }
        link_owned_groups(tx, id, group_ids, user).await
    }

    async fn detach_in(
        tx: &mut dyn RecipeBookTransaction,
        user: &UserId,
        id: &RecipeId,
        group_id: &GroupId,
    ) -> Result<(), Error> {
        load_owned_recipe(tx, id, user).await?;
        tx.find_group(group_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::entity_not_found("group"))?;
        tx.unlink_group(id, group_id)
            .await
            .map_err(map_store_error)?;
        Ok(())
    }

    async fn delete_group_in(
        tx: &mut dyn RecipeBookTransaction,
        user: &UserId,
        id: &GroupId,
    ) -> Result<GroupDeletion, Error> {
        let group = tx
            .find_group(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::entity_not_found("group"))?;
        if !group.is_owned_by(user) {
            return Err(Error::forbidden("you do not own this group"));
        }

        let recipes = tx.linked_recipe_ids(id).await.map_err(map_store_error)?;
        purge_recipes(tx, &recipes).await?;
        purge_groups(tx, &[*id]).await?;

        Ok(GroupDeletion {
            deleted_recipe_count: recipes.len() as u64,
        })
    }

    async fn delete_user_in(tx: &mut dyn RecipeBookTransaction, user: &UserId) -> Result<(), Error> {
        tx.find_user(user)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::entity_not_found("user"))?;

        let recipes = tx.recipe_ids_owned_by(user).await.map_err(map_store_error)?;
        purge_recipes(tx, &recipes).await?;
        let groups = tx.group_ids_owned_by(user).await.map_err(map_store_error)?;
        purge_groups(tx, &groups).await?;
        tx.delete_user(user).await.map_err(map_store_error)
    }

    /// Delete a group and every recipe linked to it.
    ///
    /// Linked recipes are removed even when they also belong to other groups,
    /// and their links to those groups go with them.
    pub async fn delete_group(&self, caller: &Caller, id: &GroupId) -> Result<GroupDeletion, Error> {
        let user = caller.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = Self::delete_group_in(tx.as_mut(), user, id).await;
        let deletion = finish(tx, outcome).await?;
        info!(
            group_id = %id,
            deleted_recipes = deletion.deleted_recipe_count,
            "group deleted"
        );
        Ok(deletion)
    }

    /// Delete an account with every recipe and group it owns.
    pub async fn delete_user(&self, caller: &Caller) -> Result<(), Error> {
        let user = caller.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = Self::delete_user_in(tx.as_mut(), user).await;
        finish(tx, outcome).await?;
        info!(user_id = %user, "account deleted");
        Ok(())
    }
}

#[async_trait]
impl<S> RecipeCommand for ConsistencyService<S>
where
    S: RecipeBookStore,
{
    async fn create_recipe(
        &self,
        caller: &Caller,
        input: RecipeInput,
    ) -> Result<RecipeAggregate, Error> {
        let owner = caller.require_user()?;
        let draft = RecipeDraft::try_from(input).map_err(|err| Error::invalid_field(&err))?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = self.create_in(tx.as_mut(), owner, draft).await;
        finish(tx, outcome).await
    }

    async fn update_recipe(
        &self,
        caller: &Caller,
        id: &RecipeId,
        input: RecipePatchInput,
    ) -> Result<RecipeAggregate, Error> {
        let user = caller.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = self.update_in(tx.as_mut(), user, id, input).await;
        finish(tx, outcome).await
    }

    async fn delete_recipe(&self, caller: &Caller, id: &RecipeId) -> Result<(), Error> {
        let user = caller.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = Self::delete_recipe_in(tx.as_mut(), user, id).await;
        finish(tx, outcome).await
    }

    async fn attach_to_groups(
        &self,
        caller: &Caller,
        id: &RecipeId,
        group_ids: Vec<GroupId>,
    ) -> Result<u64, Error> {
        let user = caller.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = Self::attach_in(tx.as_mut(), user, id, &group_ids).await;
        finish(tx, outcome).await
    }

    async fn detach_from_group(
        &self,
        caller: &Caller,
        id: &RecipeId,
        group_id: &GroupId,
    ) -> Result<(), Error> {
        let user = caller.require_user()?;
        let mut tx = begin(self.store.as_ref()).await?;
        let outcome = Self::detach_in(tx.as_mut(), user, id, group_id).await;
        finish(tx, outcome).await
    }
}

#[cfg(test)]
#[path = "consistency_tests.rs"]
mod tests;
