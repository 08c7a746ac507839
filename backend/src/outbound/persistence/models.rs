//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Reads convert back through the validated
//! domain constructors, so a row that violates a domain rule surfaces as a
//! query error rather than an invalid value.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::RecipeBookStoreError;
use crate::domain::{
    EmailAddress, Group, GroupId, GroupName, Ingredient, OwnerSummary, Recipe, RecipeId,
    RecipeTitle, Step, User, UserId, Username,
};

use super::schema::{groups, ingredients, recipe_groups, recipes, steps, users};

fn corrupt(table: &str, error: impl std::fmt::Display) -> RecipeBookStoreError {
    RecipeBookStoreError::query(format!("invalid {table} row: {error}"))
}

pub(crate) fn position_to_column(position: u32) -> Result<i32, RecipeBookStoreError> {
    i32::try_from(position).map_err(|_| RecipeBookStoreError::query("position out of range"))
}

fn position_from_column(table: &str, position: i32) -> Result<u32, RecipeBookStoreError> {
    u32::try_from(position).map_err(|err| corrupt(table, err))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<(User, String), RecipeBookStoreError> {
        let user = User {
            id: UserId::from_uuid(self.id),
            username: Username::new(&self.username).map_err(|err| corrupt("users", err))?,
            email: EmailAddress::new(&self.email).map_err(|err| corrupt("users", err))?,
            created_at: self.created_at,
        };
        Ok((user, self.password_hash))
    }
}

/// Narrow projection used when assembling recipe owners.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OwnerRow {
    pub id: Uuid,
    pub username: String,
}

impl OwnerRow {
    pub(crate) fn into_domain(self) -> Result<OwnerSummary, RecipeBookStoreError> {
        Ok(OwnerSummary {
            id: UserId::from_uuid(self.id),
            username: Username::new(&self.username).map_err(|err| corrupt("users", err))?,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub username: &'a str,
    pub email: &'a str,
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// Row struct for reading from the groups table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupRow {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl GroupRow {
    pub(crate) fn into_domain(self) -> Result<Group, RecipeBookStoreError> {
        Ok(Group {
            id: GroupId::from_uuid(self.id),
            name: GroupName::new(&self.name).map_err(|err| corrupt("groups", err))?,
            owner_id: UserId::from_uuid(self.owner_id),
            created_at: self.created_at,
        })
    }
}

impl From<&Group> for GroupRow {
    fn from(group: &Group) -> Self {
        Self {
            id: *group.id.as_uuid(),
            name: group.name.as_ref().to_owned(),
            owner_id: *group.owner_id.as_uuid(),
            created_at: group.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

/// Row struct for the recipes table, used for reads, inserts and updates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RecipeRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub prep_time: Option<String>,
    pub servings: Option<i32>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecipeRow {
    pub(crate) fn into_domain(self) -> Result<Recipe, RecipeBookStoreError> {
        Ok(Recipe {
            id: RecipeId::from_uuid(self.id),
            title: RecipeTitle::new(&self.title).map_err(|err| corrupt("recipes", err))?,
            description: self.description,
            image_url: self.image_url,
            prep_time: self.prep_time,
            servings: self.servings,
            owner_id: UserId::from_uuid(self.owner_id),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<&Recipe> for RecipeRow {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: *recipe.id.as_uuid(),
            title: recipe.title.as_ref().to_owned(),
            description: recipe.description.clone(),
            image_url: recipe.image_url.clone(),
            prep_time: recipe.prep_time.clone(),
            servings: recipe.servings,
            owner_id: *recipe.owner_id.as_uuid(),
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Ingredients and steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = ingredients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IngredientRow {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub name: String,
    pub quantity: String,
    pub position: i32,
}

impl IngredientRow {
    pub(crate) fn new(recipe: &RecipeId, ingredient: &Ingredient) -> Result<Self, RecipeBookStoreError> {
        Ok(Self {
            id: ingredient.id,
            recipe_id: *recipe.as_uuid(),
            name: ingredient.name.clone(),
            quantity: ingredient.quantity.clone(),
            position: position_to_column(ingredient.position)?,
        })
    }

    pub(crate) fn into_domain(self) -> Result<(RecipeId, Ingredient), RecipeBookStoreError> {
        Ok((
            RecipeId::from_uuid(self.recipe_id),
            Ingredient {
                id: self.id,
                name: self.name,
                quantity: self.quantity,
                position: position_from_column("ingredients", self.position)?,
            },
        ))
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = steps)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StepRow {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub description: String,
    pub position: i32,
}

impl StepRow {
    pub(crate) fn new(recipe: &RecipeId, step: &Step) -> Result<Self, RecipeBookStoreError> {
        Ok(Self {
            id: step.id,
            recipe_id: *recipe.as_uuid(),
            description: step.description.clone(),
            position: position_to_column(step.position)?,
        })
    }

    pub(crate) fn into_domain(self) -> Result<(RecipeId, Step), RecipeBookStoreError> {
        Ok((
            RecipeId::from_uuid(self.recipe_id),
            Step {
                id: self.id,
                description: self.description,
                position: position_from_column("steps", self.position)?,
            },
        ))
    }
}

// ---------------------------------------------------------------------------
// Memberships
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = recipe_groups)]
pub(crate) struct RecipeGroupRow {
    pub recipe_id: Uuid,
    pub group_id: Uuid,
}
