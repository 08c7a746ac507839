//! In-process recipe book store.
//!
//! Used by tests and as the development fallback when no database URL is
//! configured. A transaction takes the store lock, works on a private copy of
//! the state and swaps it in on commit, so transactions are serialized and an
//! abandoned handle leaves nothing behind. Uniqueness rules mirror the SQL
//! schema's unique indexes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::domain::ports::{
    GroupStore, IdentityCollision, IdentityStore, RecipeBookStore, RecipeBookStoreError,
    RecipeBookTransaction, RecipeStore, StoredCredentials,
};
use crate::domain::{
    AggregateParts, EmailAddress, Group, GroupId, GroupName, GroupSummary, Ingredient,
    OwnerSummary, Recipe, RecipeAggregate, RecipeFilter, RecipeId, RecipeTitle, Step, User,
    UserId, Username,
};

#[derive(Debug, Clone)]
struct UserRow {
    user: User,
    password_hash: String,
}

#[derive(Debug, Clone, Default)]
struct RecipeBookState {
    users: BTreeMap<UserId, UserRow>,
    groups: BTreeMap<GroupId, Group>,
    recipes: BTreeMap<RecipeId, Recipe>,
    ingredients: Vec<(RecipeId, Ingredient)>,
    steps: Vec<(RecipeId, Step)>,
    links: BTreeSet<(RecipeId, GroupId)>,
}

/// Recipe book store held entirely in memory.
///
/// # Examples
/// ```
/// use recipe_backend::domain::ports::RecipeBookStore;
/// use recipe_backend::outbound::memory::InMemoryRecipeBookStore;
///
/// let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// runtime.block_on(async {
///     let store = InMemoryRecipeBookStore::new();
///     let tx = store.begin().await.unwrap();
///     tx.rollback().await.unwrap();
/// });
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecipeBookStore {
    state: Arc<Mutex<RecipeBookState>>,
    fault: Arc<StdMutex<Option<&'static str>>>,
}

impl InMemoryRecipeBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call to the named store operation fail with a query
    /// error. Used to exercise rollback paths.
    pub fn fail_on(&self, operation: &'static str) {
        if let Ok(mut fault) = self.fault.lock() {
            *fault = Some(operation);
        }
    }
}

#[async_trait]
impl RecipeBookStore for InMemoryRecipeBookStore {
    async fn begin(&self) -> Result<Box<dyn RecipeBookTransaction>, RecipeBookStoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction {
            guard,
            working,
            fault: Arc::clone(&self.fault),
        }))
    }
}

struct InMemoryTransaction {
    guard: OwnedMutexGuard<RecipeBookState>,
    working: RecipeBookState,
    fault: Arc<StdMutex<Option<&'static str>>>,
}

impl InMemoryTransaction {
    fn check(&self, operation: &'static str) -> Result<(), RecipeBookStoreError> {
        let Ok(mut fault) = self.fault.lock() else {
            return Err(RecipeBookStoreError::connection("fault register poisoned"));
        };
        if *fault == Some(operation) {
            *fault = None;
            debug!(operation, "injected store failure");
            return Err(RecipeBookStoreError::query(format!(
                "injected failure in {operation}"
            )));
        }
        Ok(())
    }

    fn owner_summary(&self, owner: &UserId) -> Option<OwnerSummary> {
        self.working
            .users
            .get(owner)
            .map(|row| OwnerSummary::from(&row.user))
    }

    fn assemble(&self, recipes: Vec<Recipe>) -> Result<Vec<RecipeAggregate>, RecipeBookStoreError> {
        let ids: BTreeSet<RecipeId> = recipes.iter().map(|recipe| recipe.id).collect();
        let owners: Vec<OwnerSummary> = recipes
            .iter()
            .map(|recipe| recipe.owner_id)
            .collect::<BTreeSet<_>>()
            .iter()
            .filter_map(|owner| self.owner_summary(owner))
            .collect();
        let state = &self.working;
        let parts = AggregateParts {
            ingredients: state
                .ingredients
                .iter()
                .filter(|(recipe, _)| ids.contains(recipe))
                .cloned()
                .collect(),
            steps: state
                .steps
                .iter()
                .filter(|(recipe, _)| ids.contains(recipe))
                .cloned()
                .collect(),
            memberships: state
                .links
                .iter()
                .filter(|(recipe, _)| ids.contains(recipe))
                .filter_map(|(recipe, group)| {
                    state.groups.get(group).map(|row| (*recipe, row.clone()))
                })
                .collect(),
            owners,
            recipes,
        };
        parts
            .assemble()
            .map_err(|err| RecipeBookStoreError::query(err.to_string()))
    }
}

#[async_trait]
impl RecipeBookTransaction for InMemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<(), RecipeBookStoreError> {
        self.check("commit")?;
        let mut this = *self;
        std::mem::swap(&mut *this.guard, &mut this.working);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RecipeBookStoreError> {
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for InMemoryTransaction {
    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, RecipeBookStoreError> {
        self.check("find_user")?;
        Ok(self.working.users.get(id).map(|row| row.user.clone()))
    }

    async fn find_credentials(
        &mut self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, RecipeBookStoreError> {
        self.check("find_credentials")?;
        Ok(self
            .working
            .users
            .values()
            .find(|row| row.user.email.as_ref() == email)
            .map(|row| StoredCredentials {
                user: row.user.clone(),
                password_hash: row.password_hash.clone(),
            }))
    }

    async fn find_identity_collision(
        &mut self,
        username: Option<&Username>,
        email: Option<&EmailAddress>,
        excluding: Option<&UserId>,
    ) -> Result<Option<IdentityCollision>, RecipeBookStoreError> {
        self.check("find_identity_collision")?;
        let collision = self
            .working
            .users
            .values()
            .filter(|row| Some(&row.user.id) != excluding)
            .fold(IdentityCollision::default(), |mut found, row| {
                found.username |= username.is_some_and(|name| *name == row.user.username);
                found.email |= email.is_some_and(|address| *address == row.user.email);
                found
            });
        Ok((collision.username || collision.email).then_some(collision))
    }

    async fn insert_user(
        &mut self,
        user: &User,
        password_hash: &str,
    ) -> Result<(), RecipeBookStoreError> {
        self.check("insert_user")?;
        let clash = self.working.users.values().find_map(|row| {
            if row.user.username == user.username {
                Some("username")
            } else if row.user.email == user.email {
                Some("email")
            } else {
                None
            }
        });
        if let Some(field) = clash {
            return Err(RecipeBookStoreError::conflict(field));
        }
        self.working.users.insert(
            user.id,
            UserRow {
                user: user.clone(),
                password_hash: password_hash.to_owned(),
            },
        );
        Ok(())
    }

    async fn update_user(&mut self, user: &User) -> Result<(), RecipeBookStoreError> {
        self.check("update_user")?;
        let clash = self
            .working
            .users
            .values()
            .filter(|row| row.user.id != user.id)
            .find_map(|row| {
                if row.user.username == user.username {
                    Some("username")
                } else if row.user.email == user.email {
                    Some("email")
                } else {
                    None
                }
            });
        if let Some(field) = clash {
            return Err(RecipeBookStoreError::conflict(field));
        }
        if let Some(row) = self.working.users.get_mut(&user.id) {
            row.user.username = user.username.clone();
            row.user.email = user.email.clone();
        }
        Ok(())
    }

    async fn delete_user(&mut self, id: &UserId) -> Result<(), RecipeBookStoreError> {
        self.check("delete_user")?;
        self.working.users.remove(id);
        Ok(())
    }
}

#[async_trait]
impl GroupStore for InMemoryTransaction {
    async fn insert_group(&mut self, group: &Group) -> Result<(), RecipeBookStoreError> {
        self.check("insert_group")?;
        self.working.groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn find_group(&mut self, id: &GroupId) -> Result<Option<Group>, RecipeBookStoreError> {
        self.check("find_group")?;
        Ok(self.working.groups.get(id).cloned())
    }

    async fn find_owned_groups(
        &mut self,
        ids: &[GroupId],
        owner: &UserId,
    ) -> Result<Vec<Group>, RecipeBookStoreError> {
        self.check("find_owned_groups")?;
        let wanted: BTreeSet<&GroupId> = ids.iter().collect();
        Ok(self
            .working
            .groups
            .values()
            .filter(|group| wanted.contains(&group.id) && group.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn list_groups(
        &mut self,
        owner: &UserId,
    ) -> Result<Vec<GroupSummary>, RecipeBookStoreError> {
        self.check("list_groups")?;
        let state = &self.working;
        let mut summaries: Vec<GroupSummary> = state
            .groups
            .values()
            .filter(|group| group.is_owned_by(owner))
            .map(|group| GroupSummary {
                group: group.clone(),
                recipe_count: state
                    .links
                    .iter()
                    .filter(|(_, linked)| *linked == group.id)
                    .count() as u64,
            })
            .collect();
        summaries.sort_by(|a, b| a.group.name.as_ref().cmp(b.group.name.as_ref()));
        Ok(summaries)
    }

    async fn update_group_name(
        &mut self,
        id: &GroupId,
        name: &GroupName,
    ) -> Result<(), RecipeBookStoreError> {
        self.check("update_group_name")?;
        if let Some(group) = self.working.groups.get_mut(id) {
            group.name = name.clone();
        }
        Ok(())
    }

    async fn group_ids_owned_by(
        &mut self,
        owner: &UserId,
    ) -> Result<Vec<GroupId>, RecipeBookStoreError> {
        self.check("group_ids_owned_by")?;
        Ok(self
            .working
            .groups
            .values()
            .filter(|group| group.is_owned_by(owner))
            .map(|group| group.id)
            .collect())
    }

    async fn linked_recipe_ids(
        &mut self,
        group: &GroupId,
    ) -> Result<Vec<RecipeId>, RecipeBookStoreError> {
        self.check("linked_recipe_ids")?;
        Ok(self
            .working
            .links
            .iter()
            .filter(|(_, linked)| linked == group)
            .map(|(recipe, _)| *recipe)
            .collect())
    }

    async fn delete_group_links(
        &mut self,
        groups: &[GroupId],
    ) -> Result<u64, RecipeBookStoreError> {
        self.check("delete_group_links")?;
        let before = self.working.links.len();
        self.working
            .links
            .retain(|(_, group)| !groups.contains(group));
        Ok((before - self.working.links.len()) as u64)
    }

    async fn delete_groups(&mut self, groups: &[GroupId]) -> Result<u64, RecipeBookStoreError> {
        self.check("delete_groups")?;
        let linked = self
            .working
            .links
            .iter()
            .any(|(_, group)| groups.contains(group));
        if linked {
            return Err(RecipeBookStoreError::query(
                "group still has recipe links",
            ));
        }
        let removed = groups
            .iter()
            .filter(|id| self.working.groups.remove(*id).is_some())
            .count();
        Ok(removed as u64)
    }
}

fn retain_unowned<T>(rows: &mut Vec<(RecipeId, T)>, recipes: &[RecipeId]) -> u64 {
    let before = rows.len();
    rows.retain(|(recipe, _)| !recipes.contains(recipe));
    (before - rows.len()) as u64
}

#[async_trait]
impl RecipeStore for InMemoryTransaction {
    async fn find_recipe(&mut self, id: &RecipeId) -> Result<Option<Recipe>, RecipeBookStoreError> {
        self.check("find_recipe")?;
        Ok(self.working.recipes.get(id).cloned())
    }

    async fn title_taken(
        &mut self,
        title: &RecipeTitle,
        excluding: Option<&RecipeId>,
    ) -> Result<bool, RecipeBookStoreError> {
        self.check("title_taken")?;
        Ok(self
            .working
            .recipes
            .values()
            .any(|recipe| recipe.title == *title && Some(&recipe.id) != excluding))
    }

    async fn insert_recipe(&mut self, recipe: &Recipe) -> Result<(), RecipeBookStoreError> {
        self.check("insert_recipe")?;
        if self
            .working
            .recipes
            .values()
            .any(|existing| existing.title == recipe.title)
        {
            return Err(RecipeBookStoreError::conflict("title"));
        }
        if !self.working.users.contains_key(&recipe.owner_id) {
            return Err(RecipeBookStoreError::query("recipe owner does not exist"));
        }
        self.working.recipes.insert(recipe.id, recipe.clone());
        Ok(())
    }

    async fn update_recipe(&mut self, recipe: &Recipe) -> Result<(), RecipeBookStoreError> {
        self.check("update_recipe")?;
        if self
            .working
            .recipes
            .values()
            .any(|existing| existing.title == recipe.title && existing.id != recipe.id)
        {
            return Err(RecipeBookStoreError::conflict("title"));
        }
        if let Some(stored) = self.working.recipes.get_mut(&recipe.id) {
            *stored = recipe.clone();
        }
        Ok(())
    }

    async fn insert_ingredients(
        &mut self,
        recipe: &RecipeId,
        ingredients: &[Ingredient],
    ) -> Result<(), RecipeBookStoreError> {
        self.check("insert_ingredients")?;
        self.working
            .ingredients
            .extend(ingredients.iter().cloned().map(|item| (*recipe, item)));
        Ok(())
    }

    async fn delete_ingredients(
        &mut self,
        recipes: &[RecipeId],
    ) -> Result<u64, RecipeBookStoreError> {
        self.check("delete_ingredients")?;
        Ok(retain_unowned(&mut self.working.ingredients, recipes))
    }

    async fn insert_steps(
        &mut self,
        recipe: &RecipeId,
        steps: &[Step],
    ) -> Result<(), RecipeBookStoreError> {
        self.check("insert_steps")?;
        self.working
            .steps
            .extend(steps.iter().cloned().map(|item| (*recipe, item)));
        Ok(())
    }

    async fn delete_steps(&mut self, recipes: &[RecipeId]) -> Result<u64, RecipeBookStoreError> {
        self.check("delete_steps")?;
        Ok(retain_unowned(&mut self.working.steps, recipes))
    }

    async fn link_groups(
        &mut self,
        recipe: &RecipeId,
        groups: &[GroupId],
    ) -> Result<u64, RecipeBookStoreError> {
        self.check("link_groups")?;
        let created = groups
            .iter()
            .filter(|group| self.working.links.insert((*recipe, **group)))
            .count();
        Ok(created as u64)
    }

    async fn unlink_group(
        &mut self,
        recipe: &RecipeId,
        group: &GroupId,
    ) -> Result<bool, RecipeBookStoreError> {
        self.check("unlink_group")?;
        Ok(self.working.links.remove(&(*recipe, *group)))
    }

    async fn delete_recipe_links(
        &mut self,
        recipes: &[RecipeId],
    ) -> Result<u64, RecipeBookStoreError> {
        self.check("delete_recipe_links")?;
        let before = self.working.links.len();
        self.working
            .links
            .retain(|(recipe, _)| !recipes.contains(recipe));
        Ok((before - self.working.links.len()) as u64)
    }

    async fn delete_recipes(&mut self, recipes: &[RecipeId]) -> Result<u64, RecipeBookStoreError> {
        self.check("delete_recipes")?;
        let state = &self.working;
        let dependants = state.links.iter().any(|(recipe, _)| recipes.contains(recipe))
            || state.ingredients.iter().any(|(recipe, _)| recipes.contains(recipe))
            || state.steps.iter().any(|(recipe, _)| recipes.contains(recipe));
        if dependants {
            return Err(RecipeBookStoreError::query("recipe still has dependent rows"));
        }
        let removed = recipes
            .iter()
            .filter(|id| self.working.recipes.remove(*id).is_some())
            .count();
        Ok(removed as u64)
    }

    async fn recipe_ids_owned_by(
        &mut self,
        owner: &UserId,
    ) -> Result<Vec<RecipeId>, RecipeBookStoreError> {
        self.check("recipe_ids_owned_by")?;
        Ok(self
            .working
            .recipes
            .values()
            .filter(|recipe| recipe.is_owned_by(owner))
            .map(|recipe| recipe.id)
            .collect())
    }

    async fn load_aggregates(
        &mut self,
        filter: &RecipeFilter,
    ) -> Result<Vec<RecipeAggregate>, RecipeBookStoreError> {
        self.check("load_aggregates")?;
        let mut recipes: Vec<Recipe> = self
            .working
            .recipes
            .values()
            .filter(|recipe| filter.owner.is_none_or(|owner| recipe.is_owned_by(&owner)))
            .filter(|recipe| filter.matches_title(&recipe.title))
            .cloned()
            .collect();
        recipes.sort_by(|a, b| a.title.cmp(&b.title));
        self.assemble(recipes)
    }

    async fn load_aggregate(
        &mut self,
        id: &RecipeId,
    ) -> Result<Option<RecipeAggregate>, RecipeBookStoreError> {
        self.check("load_aggregate")?;
        let Some(recipe) = self.working.recipes.get(id).cloned() else {
            return Ok(None);
        };
        Ok(self.assemble(vec![recipe])?.into_iter().next())
    }
}
