//! Group rows and recipe memberships seen from the group side.

use async_trait::async_trait;

use crate::domain::{Group, GroupId, GroupName, GroupSummary, RecipeId, UserId};

use super::recipe_book_store::RecipeBookStoreError;

/// Group persistence operations.
#[async_trait]
pub trait GroupStore: Send {
    async fn insert_group(&mut self, group: &Group) -> Result<(), RecipeBookStoreError>;

    async fn find_group(&mut self, id: &GroupId) -> Result<Option<Group>, RecipeBookStoreError>;

    /// Resolve the subset of `ids` that exist and belong to `owner`.
    async fn find_owned_groups(
        &mut self,
        ids: &[GroupId],
        owner: &UserId,
    ) -> Result<Vec<Group>, RecipeBookStoreError>;

    /// Groups of `owner` ordered by name, each with its linked recipe count.
    async fn list_groups(
        &mut self,
        owner: &UserId,
    ) -> Result<Vec<GroupSummary>, RecipeBookStoreError>;

    async fn update_group_name(
        &mut self,
        id: &GroupId,
        name: &GroupName,
    ) -> Result<(), RecipeBookStoreError>;

    async fn group_ids_owned_by(
        &mut self,
        owner: &UserId,
    ) -> Result<Vec<GroupId>, RecipeBookStoreError>;

    /// Ids of the recipes currently linked to `group`.
    async fn linked_recipe_ids(
        &mut self,
        group: &GroupId,
    ) -> Result<Vec<RecipeId>, RecipeBookStoreError>;

    /// Remove every membership row of the given groups.
    async fn delete_group_links(&mut self, groups: &[GroupId])
    -> Result<u64, RecipeBookStoreError>;

    /// Remove the group rows themselves.
    async fn delete_groups(&mut self, groups: &[GroupId]) -> Result<u64, RecipeBookStoreError>;
}
