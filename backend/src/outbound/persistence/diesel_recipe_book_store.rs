//! PostgreSQL-backed recipe book store.
//!
//! `begin` checks out an owned pooled connection and opens a transaction on
//! it with `AnsiTransactionManager`; every port call on the returned handle
//! runs on that connection until `commit` or `rollback`. A handle dropped
//! without either leaves its connection mid-transaction, which the pool
//! manager treats as broken and closes, so the server rolls the work back.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use uuid::Uuid;

use crate::domain::ports::{
    GroupStore, IdentityCollision, IdentityStore, RecipeBookStore, RecipeBookStoreError,
    RecipeBookTransaction, RecipeStore, StoredCredentials,
};
use crate::domain::{
    AggregateParts, EmailAddress, Group, GroupId, GroupName, GroupSummary, Ingredient, Recipe,
    RecipeAggregate, RecipeFilter, RecipeId, RecipeTitle, Step, User, UserId, Username,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    GroupRow, IngredientRow, NewUserRow, OwnerRow, RecipeGroupRow, RecipeRow, StepRow, UserRow,
    UserUpdate,
};
use super::pool::{DbPool, OwnedConnection};
use super::schema::{groups, ingredients, recipe_groups, recipes, steps, users};

/// `%needle%` with LIKE metacharacters escaped, so a search for `50%`
/// matches the literal text.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn recipe_uuids(ids: &[RecipeId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

fn group_uuids(ids: &[GroupId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

/// Flags which requested fields appear among the `(username, email)` rows
/// returned by the collision lookup.
pub(crate) fn collision_from_rows(
    username: Option<&str>,
    email: Option<&str>,
    rows: &[(String, String)],
) -> Option<IdentityCollision> {
    let collision = IdentityCollision {
        username: username.is_some_and(|name| rows.iter().any(|(taken, _)| taken == name)),
        email: email.is_some_and(|address| rows.iter().any(|(_, taken)| taken == address)),
    };
    (collision.username || collision.email).then_some(collision)
}

fn affected(rows: usize) -> u64 {
    rows as u64
}

/// Diesel-backed [`RecipeBookStore`].
#[derive(Clone)]
pub struct DieselRecipeBookStore {
    pool: DbPool,
}

impl DieselRecipeBookStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeBookStore for DieselRecipeBookStore {
    async fn begin(&self) -> Result<Box<dyn RecipeBookTransaction>, RecipeBookStoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Box::new(DieselTransaction { conn }))
    }
}

struct DieselTransaction {
    conn: OwnedConnection,
}

impl DieselTransaction {
    fn conn(&mut self) -> &mut AsyncPgConnection {
        &mut self.conn
    }

    /// Load children, memberships and owners for `recipes` and stitch them
    /// into aggregates, keeping the order of `recipes`.
    async fn assemble(
        &mut self,
        recipes: Vec<Recipe>,
    ) -> Result<Vec<RecipeAggregate>, RecipeBookStoreError> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = recipes.iter().map(|recipe| *recipe.id.as_uuid()).collect();
        let owner_ids: Vec<Uuid> = recipes
            .iter()
            .map(|recipe| *recipe.owner_id.as_uuid())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let ingredient_rows: Vec<IngredientRow> = ingredients::table
            .filter(ingredients::recipe_id.eq_any(&ids))
            .order((ingredients::recipe_id, ingredients::position))
            .select(IngredientRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        let step_rows: Vec<StepRow> = steps::table
            .filter(steps::recipe_id.eq_any(&ids))
            .order((steps::recipe_id, steps::position))
            .select(StepRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        let membership_rows: Vec<(Uuid, GroupRow)> = recipe_groups::table
            .inner_join(groups::table)
            .filter(recipe_groups::recipe_id.eq_any(&ids))
            .select((recipe_groups::recipe_id, GroupRow::as_select()))
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        let owner_rows: Vec<OwnerRow> = users::table
            .filter(users::id.eq_any(&owner_ids))
            .select(OwnerRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;

        let parts = AggregateParts {
            recipes,
            ingredients: ingredient_rows
                .into_iter()
                .map(IngredientRow::into_domain)
                .collect::<Result<_, _>>()?,
            steps: step_rows
                .into_iter()
                .map(StepRow::into_domain)
                .collect::<Result<_, _>>()?,
            memberships: membership_rows
                .into_iter()
                .map(|(recipe, group)| Ok((RecipeId::from_uuid(recipe), group.into_domain()?)))
                .collect::<Result<_, RecipeBookStoreError>>()?,
            owners: owner_rows
                .into_iter()
                .map(OwnerRow::into_domain)
                .collect::<Result<_, _>>()?,
        };
        parts
            .assemble()
            .map_err(|err| RecipeBookStoreError::query(err.to_string()))
    }
}

#[async_trait]
impl RecipeBookTransaction for DieselTransaction {
    async fn commit(self: Box<Self>) -> Result<(), RecipeBookStoreError> {
        let mut this = *self;
        AnsiTransactionManager::commit_transaction(this.conn())
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(self: Box<Self>) -> Result<(), RecipeBookStoreError> {
        let mut this = *self;
        AnsiTransactionManager::rollback_transaction(this.conn())
            .await
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl IdentityStore for DieselTransaction {
    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, RecipeBookStoreError> {
        let row: Option<UserRow> = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| row.into_domain().map(|(user, _)| user))
            .transpose()
    }

    async fn find_credentials(
        &mut self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, RecipeBookStoreError> {
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| {
            row.into_domain()
                .map(|(user, password_hash)| StoredCredentials {
                    user,
                    password_hash,
                })
        })
        .transpose()
    }

    async fn find_identity_collision(
        &mut self,
        username: Option<&Username>,
        email: Option<&EmailAddress>,
        excluding: Option<&UserId>,
    ) -> Result<Option<IdentityCollision>, RecipeBookStoreError> {
        let username = username.map(AsRef::as_ref);
        let email = email.map(AsRef::as_ref);
        let query = users::table
            .select((users::username, users::email))
            .into_boxed();
        let mut query = match (username, email) {
            (Some(name), Some(address)) => {
                query.filter(users::username.eq(name).or(users::email.eq(address)))
            }
            (Some(name), None) => query.filter(users::username.eq(name)),
            (None, Some(address)) => query.filter(users::email.eq(address)),
            (None, None) => return Ok(None),
        };
        if let Some(id) = excluding {
            query = query.filter(users::id.ne(*id.as_uuid()));
        }
        let rows: Vec<(String, String)> = query
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(collision_from_rows(username, email, &rows))
    }

    async fn insert_user(
        &mut self,
        user: &User,
        password_hash: &str,
    ) -> Result<(), RecipeBookStoreError> {
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            password_hash,
            created_at: user.created_at,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_user(&mut self, user: &User) -> Result<(), RecipeBookStoreError> {
        let changes = UserUpdate {
            username: user.username.as_ref(),
            email: user.email.as_ref(),
        };
        diesel::update(users::table.find(*user.id.as_uuid()))
            .set(&changes)
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete_user(&mut self, id: &UserId) -> Result<(), RecipeBookStoreError> {
        diesel::delete(users::table.find(*id.as_uuid()))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}

#[async_trait]
impl GroupStore for DieselTransaction {
    async fn insert_group(&mut self, group: &Group) -> Result<(), RecipeBookStoreError> {
        diesel::insert_into(groups::table)
            .values(GroupRow::from(group))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_group(&mut self, id: &GroupId) -> Result<Option<Group>, RecipeBookStoreError> {
        let row: Option<GroupRow> = groups::table
            .find(*id.as_uuid())
            .select(GroupRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(GroupRow::into_domain).transpose()
    }

    async fn find_owned_groups(
        &mut self,
        ids: &[GroupId],
        owner: &UserId,
    ) -> Result<Vec<Group>, RecipeBookStoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<GroupRow> = groups::table
            .filter(groups::id.eq_any(group_uuids(ids)))
            .filter(groups::owner_id.eq(*owner.as_uuid()))
            .select(GroupRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(GroupRow::into_domain).collect()
    }

    async fn list_groups(
        &mut self,
        owner: &UserId,
    ) -> Result<Vec<GroupSummary>, RecipeBookStoreError> {
        let rows: Vec<GroupRow> = groups::table
            .filter(groups::owner_id.eq(*owner.as_uuid()))
            .order(groups::name.asc())
            .select(GroupRow::as_select())
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let counts: HashMap<Uuid, i64> = recipe_groups::table
            .filter(recipe_groups::group_id.eq_any(&ids))
            .group_by(recipe_groups::group_id)
            .select((recipe_groups::group_id, count_star()))
            .load::<(Uuid, i64)>(self.conn())
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();

        rows.into_iter()
            .map(|row| {
                let recipe_count = counts
                    .get(&row.id)
                    .copied()
                    .map_or(0, |count| u64::try_from(count).unwrap_or(0));
                Ok(GroupSummary {
                    group: row.into_domain()?,
                    recipe_count,
                })
            })
            .collect()
    }

    async fn update_group_name(
        &mut self,
        id: &GroupId,
        name: &GroupName,
    ) -> Result<(), RecipeBookStoreError> {
        diesel::update(groups::table.find(*id.as_uuid()))
            .set(groups::name.eq(name.as_ref()))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn group_ids_owned_by(
        &mut self,
        owner: &UserId,
    ) -> Result<Vec<GroupId>, RecipeBookStoreError> {
        let ids: Vec<Uuid> = groups::table
            .filter(groups::owner_id.eq(*owner.as_uuid()))
            .select(groups::id)
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(ids.into_iter().map(GroupId::from_uuid).collect())
    }

    async fn linked_recipe_ids(
        &mut self,
        group: &GroupId,
    ) -> Result<Vec<RecipeId>, RecipeBookStoreError> {
        let ids: Vec<Uuid> = recipe_groups::table
            .filter(recipe_groups::group_id.eq(*group.as_uuid()))
            .select(recipe_groups::recipe_id)
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(ids.into_iter().map(RecipeId::from_uuid).collect())
    }

    async fn delete_group_links(
        &mut self,
        group_ids: &[GroupId],
    ) -> Result<u64, RecipeBookStoreError> {
        if group_ids.is_empty() {
            return Ok(0);
        }
        diesel::delete(
            recipe_groups::table.filter(recipe_groups::group_id.eq_any(group_uuids(group_ids))),
        )
            .execute(self.conn())
            .await
            .map(affected)
            .map_err(map_diesel_error)
    }

    async fn delete_groups(&mut self, ids: &[GroupId]) -> Result<u64, RecipeBookStoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        diesel::delete(groups::table.filter(groups::id.eq_any(group_uuids(ids))))
            .execute(self.conn())
            .await
            .map(affected)
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl RecipeStore for DieselTransaction {
    async fn find_recipe(&mut self, id: &RecipeId) -> Result<Option<Recipe>, RecipeBookStoreError> {
        let row: Option<RecipeRow> = recipes::table
            .find(*id.as_uuid())
            .select(RecipeRow::as_select())
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(RecipeRow::into_domain).transpose()
    }

    async fn title_taken(
        &mut self,
        title: &RecipeTitle,
        excluding: Option<&RecipeId>,
    ) -> Result<bool, RecipeBookStoreError> {
        let mut query = recipes::table
            .filter(recipes::title.eq(title.as_ref()))
            .select(recipes::id)
            .into_boxed();
        if let Some(id) = excluding {
            query = query.filter(recipes::id.ne(*id.as_uuid()));
        }
        let found: Option<Uuid> = query
            .first(self.conn())
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(found.is_some())
    }

    async fn insert_recipe(&mut self, recipe: &Recipe) -> Result<(), RecipeBookStoreError> {
        diesel::insert_into(recipes::table)
            .values(RecipeRow::from(recipe))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_recipe(&mut self, recipe: &Recipe) -> Result<(), RecipeBookStoreError> {
        diesel::update(recipes::table.find(*recipe.id.as_uuid()))
            .set(RecipeRow::from(recipe))
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn insert_ingredients(
        &mut self,
        recipe: &RecipeId,
        items: &[Ingredient],
    ) -> Result<(), RecipeBookStoreError> {
        if items.is_empty() {
            return Ok(());
        }
        let rows = items
            .iter()
            .map(|item| IngredientRow::new(recipe, item))
            .collect::<Result<Vec<_>, _>>()?;
        diesel::insert_into(ingredients::table)
            .values(&rows)
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete_ingredients(
        &mut self,
        recipe_ids: &[RecipeId],
    ) -> Result<u64, RecipeBookStoreError> {
        if recipe_ids.is_empty() {
            return Ok(0);
        }
        diesel::delete(ingredients::table.filter(ingredients::recipe_id.eq_any(recipe_uuids(recipe_ids))))
            .execute(self.conn())
            .await
            .map(affected)
            .map_err(map_diesel_error)
    }

    async fn insert_steps(
        &mut self,
        recipe: &RecipeId,
        items: &[Step],
    ) -> Result<(), RecipeBookStoreError> {
        if items.is_empty() {
            return Ok(());
        }
        let rows = items
            .iter()
            .map(|item| StepRow::new(recipe, item))
            .collect::<Result<Vec<_>, _>>()?;
        diesel::insert_into(steps::table)
            .values(&rows)
            .execute(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn delete_steps(&mut self, recipe_ids: &[RecipeId]) -> Result<u64, RecipeBookStoreError> {
        if recipe_ids.is_empty() {
            return Ok(0);
        }
        diesel::delete(steps::table.filter(steps::recipe_id.eq_any(recipe_uuids(recipe_ids))))
            .execute(self.conn())
            .await
            .map(affected)
            .map_err(map_diesel_error)
    }

    async fn link_groups(
        &mut self,
        recipe: &RecipeId,
        group_ids: &[GroupId],
    ) -> Result<u64, RecipeBookStoreError> {
        if group_ids.is_empty() {
            return Ok(0);
        }
        let rows: Vec<RecipeGroupRow> = group_ids
            .iter()
            .map(|group| RecipeGroupRow {
                recipe_id: *recipe.as_uuid(),
                group_id: *group.as_uuid(),
            })
            .collect();
        diesel::insert_into(recipe_groups::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(self.conn())
            .await
            .map(affected)
            .map_err(map_diesel_error)
    }

    async fn unlink_group(
        &mut self,
        recipe: &RecipeId,
        group: &GroupId,
    ) -> Result<bool, RecipeBookStoreError> {
        let removed = diesel::delete(
            recipe_groups::table
                .filter(recipe_groups::recipe_id.eq(*recipe.as_uuid()))
                .filter(recipe_groups::group_id.eq(*group.as_uuid())),
        )
        .execute(self.conn())
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn delete_recipe_links(
        &mut self,
        recipe_ids: &[RecipeId],
    ) -> Result<u64, RecipeBookStoreError> {
        if recipe_ids.is_empty() {
            return Ok(0);
        }
        diesel::delete(
            recipe_groups::table.filter(recipe_groups::recipe_id.eq_any(recipe_uuids(recipe_ids))),
        )
        .execute(self.conn())
        .await
        .map(affected)
        .map_err(map_diesel_error)
    }

    async fn delete_recipes(&mut self, recipe_ids: &[RecipeId]) -> Result<u64, RecipeBookStoreError> {
        if recipe_ids.is_empty() {
            return Ok(0);
        }
        diesel::delete(recipes::table.filter(recipes::id.eq_any(recipe_uuids(recipe_ids))))
            .execute(self.conn())
            .await
            .map(affected)
            .map_err(map_diesel_error)
    }

    async fn recipe_ids_owned_by(
        &mut self,
        owner: &UserId,
    ) -> Result<Vec<RecipeId>, RecipeBookStoreError> {
        let ids: Vec<Uuid> = recipes::table
            .filter(recipes::owner_id.eq(*owner.as_uuid()))
            .select(recipes::id)
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        Ok(ids.into_iter().map(RecipeId::from_uuid).collect())
    }

    async fn load_aggregates(
        &mut self,
        filter: &RecipeFilter,
    ) -> Result<Vec<RecipeAggregate>, RecipeBookStoreError> {
        let mut query = recipes::table
            .select(RecipeRow::as_select())
            .order(recipes::title.asc())
            .into_boxed();
        if let Some(owner) = filter.owner {
            query = query.filter(recipes::owner_id.eq(*owner.as_uuid()));
        }
        if let Some(search) = filter.title_search.as_deref() {
            query = query.filter(recipes::title.ilike(contains_pattern(search)));
        }
        let rows: Vec<RecipeRow> = query
            .load(self.conn())
            .await
            .map_err(map_diesel_error)?;
        let found = rows
            .into_iter()
            .map(RecipeRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        self.assemble(found).await
    }

    async fn load_aggregate(
        &mut self,
        id: &RecipeId,
    ) -> Result<Option<RecipeAggregate>, RecipeBookStoreError> {
        let Some(recipe) = self.find_recipe(id).await? else {
            return Ok(None);
        };
        Ok(self.assemble(vec![recipe]).await?.into_iter().next())
    }
}
