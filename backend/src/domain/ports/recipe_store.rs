//! Recipe rows, their ordered children and their memberships.

use async_trait::async_trait;

use crate::domain::{
    GroupId, Ingredient, Recipe, RecipeAggregate, RecipeFilter, RecipeId, RecipeTitle, Step,
    UserId,
};

use super::recipe_book_store::RecipeBookStoreError;

/// Recipe persistence operations.
#[async_trait]
pub trait RecipeStore: Send {
    /// Load the recipe row without children.
    async fn find_recipe(&mut self, id: &RecipeId) -> Result<Option<Recipe>, RecipeBookStoreError>;

    /// True when another recipe already uses exactly this title.
    async fn title_taken(
        &mut self,
        title: &RecipeTitle,
        excluding: Option<&RecipeId>,
    ) -> Result<bool, RecipeBookStoreError>;

    async fn insert_recipe(&mut self, recipe: &Recipe) -> Result<(), RecipeBookStoreError>;

    /// Persist the scalar fields of an existing recipe.
    async fn update_recipe(&mut self, recipe: &Recipe) -> Result<(), RecipeBookStoreError>;

    async fn insert_ingredients(
        &mut self,
        recipe: &RecipeId,
        ingredients: &[Ingredient],
    ) -> Result<(), RecipeBookStoreError>;

    async fn delete_ingredients(
        &mut self,
        recipes: &[RecipeId],
    ) -> Result<u64, RecipeBookStoreError>;

    async fn insert_steps(
        &mut self,
        recipe: &RecipeId,
        steps: &[Step],
    ) -> Result<(), RecipeBookStoreError>;

    async fn delete_steps(&mut self, recipes: &[RecipeId]) -> Result<u64, RecipeBookStoreError>;

    /// Link `recipe` to each group. Existing links are left untouched.
    /// Returns the number of links created.
    async fn link_groups(
        &mut self,
        recipe: &RecipeId,
        groups: &[GroupId],
    ) -> Result<u64, RecipeBookStoreError>;

    /// Remove one membership. Returns whether a link existed.
    async fn unlink_group(
        &mut self,
        recipe: &RecipeId,
        group: &GroupId,
    ) -> Result<bool, RecipeBookStoreError>;

    /// Remove every membership of the given recipes, across all groups.
    async fn delete_recipe_links(
        &mut self,
        recipes: &[RecipeId],
    ) -> Result<u64, RecipeBookStoreError>;

    /// Remove recipe rows. Children and links are removed by the caller first.
    async fn delete_recipes(&mut self, recipes: &[RecipeId]) -> Result<u64, RecipeBookStoreError>;

    async fn recipe_ids_owned_by(
        &mut self,
        owner: &UserId,
    ) -> Result<Vec<RecipeId>, RecipeBookStoreError>;

    /// Full aggregates matching `filter`, ordered by title ascending.
    async fn load_aggregates(
        &mut self,
        filter: &RecipeFilter,
    ) -> Result<Vec<RecipeAggregate>, RecipeBookStoreError>;

    async fn load_aggregate(
        &mut self,
        id: &RecipeId,
    ) -> Result<Option<RecipeAggregate>, RecipeBookStoreError>;
}
