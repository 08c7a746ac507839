//! Recipe aggregate: a recipe with its ordered ingredients and steps, its
//! group memberships and an owner summary.
//!
//! ## Invariants
//! - A persisted recipe always has at least one ingredient and one step.
//! - Ingredient and step positions are dense, zero-based and follow the order
//!   of the list supplied at the last write.
//! - Titles are unique across all users, compared byte for byte.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::caller::Caller;
use super::error::FieldViolation;
use super::group::{Group, GroupId};
use super::identifier::uuid_identifier;
use super::user::{OwnerSummary, UserId};

uuid_identifier! {
    /// Stable recipe identifier stored as a UUID.
    RecipeId
}

/// Image shown for recipes created without one.
pub const DEFAULT_IMAGE_URL: &str = "https://placehold.co/600x400?text=Sin+Imagen";

/// Validation errors raised while building recipe drafts and patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeValidationError {
    EmptyTitle,
    MissingIngredients,
    MissingSteps,
    EmptyIngredientName { index: usize },
    EmptyStepDescription { index: usize },
    MissingGroupIds,
}

impl fmt::Display for RecipeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is required"),
            Self::MissingIngredients => write!(f, "at least one ingredient is required"),
            Self::MissingSteps => write!(f, "at least one step is required"),
            Self::EmptyIngredientName { index } => {
                write!(f, "ingredient {index} must have a name")
            }
            Self::EmptyStepDescription { index } => {
                write!(f, "step {index} must have a description")
            }
            Self::MissingGroupIds => write!(f, "at least one groupId is required"),
        }
    }
}

impl std::error::Error for RecipeValidationError {}

impl FieldViolation for RecipeValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "title",
            Self::MissingIngredients | Self::EmptyIngredientName { .. } => "ingredients",
            Self::MissingSteps | Self::EmptyStepDescription { .. } => "steps",
            Self::MissingGroupIds => "groupIds",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "missing_title",
            Self::MissingIngredients => "missing_ingredients",
            Self::MissingSteps => "missing_steps",
            Self::EmptyIngredientName { .. } => "empty_ingredient_name",
            Self::EmptyStepDescription { .. } => "empty_step_description",
            Self::MissingGroupIds => "missing_group_ids",
        }
    }
}

/// Recipe title kept exactly as supplied. Uniqueness compares the raw
/// bytes, so surrounding whitespace is significant; only blank titles are
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipeTitle(String);

impl RecipeTitle {
    pub fn new(title: impl AsRef<str>) -> Result<Self, RecipeValidationError> {
        let title = title.as_ref();
        if title.trim().is_empty() {
            return Err(RecipeValidationError::EmptyTitle);
        }
        Ok(Self(title.to_owned()))
    }
}

impl AsRef<str> for RecipeTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RecipeTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RecipeTitle> for String {
    fn from(value: RecipeTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for RecipeTitle {
    type Error = RecipeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Ingredient as supplied by a client, before positions are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientDraft {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
}

/// Step as supplied by a client, before positions are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDraft {
    pub description: String,
}

/// Persisted ingredient with its display position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub quantity: String,
    pub position: u32,
}

/// Persisted step with its display position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: Uuid,
    pub description: String,
    pub position: u32,
}

/// Assign fresh ids and dense positions `0..n-1` in list order.
pub fn position_ingredients(drafts: Vec<IngredientDraft>) -> Vec<Ingredient> {
    (0_u32..)
        .zip(drafts)
        .map(|(position, draft)| Ingredient {
            id: Uuid::new_v4(),
            name: draft.name,
            quantity: draft.quantity,
            position,
        })
        .collect()
}

/// Assign fresh ids and dense positions `0..n-1` in list order.
pub fn position_steps(drafts: Vec<StepDraft>) -> Vec<Step> {
    (0_u32..)
        .zip(drafts)
        .map(|(position, draft)| Step {
            id: Uuid::new_v4(),
            description: draft.description,
            position,
        })
        .collect()
}

fn validate_ingredients(
    ingredients: Option<Vec<IngredientDraft>>,
) -> Result<Vec<IngredientDraft>, RecipeValidationError> {
    let ingredients = ingredients.unwrap_or_default();
    if ingredients.is_empty() {
        return Err(RecipeValidationError::MissingIngredients);
    }
    Ok(ingredients)
}

fn validate_steps(steps: Option<Vec<StepDraft>>) -> Result<Vec<StepDraft>, RecipeValidationError> {
    let steps = steps.unwrap_or_default();
    if steps.is_empty() {
        return Err(RecipeValidationError::MissingSteps);
    }
    Ok(steps)
}

fn trim_items(
    ingredients: &mut [IngredientDraft],
    steps: &mut [StepDraft],
) -> Result<(), RecipeValidationError> {
    for (index, ingredient) in ingredients.iter_mut().enumerate() {
        ingredient.name = ingredient.name.trim().to_owned();
        if ingredient.name.is_empty() {
            return Err(RecipeValidationError::EmptyIngredientName { index });
        }
        ingredient.quantity = ingredient.quantity.trim().to_owned();
    }
    for (index, step) in steps.iter_mut().enumerate() {
        step.description = step.description.trim().to_owned();
        if step.description.is_empty() {
            return Err(RecipeValidationError::EmptyStepDescription { index });
        }
    }
    Ok(())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Raw create payload. Every field is optional so validation order is
/// decided here rather than by the deserialiser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub prep_time: Option<String>,
    pub servings: Option<i32>,
    pub ingredients: Option<Vec<IngredientDraft>>,
    pub steps: Option<Vec<StepDraft>>,
    pub group_ids: Vec<GroupId>,
}

/// Validated create payload.
///
/// # Examples
/// ```
/// use recipe_backend::domain::{IngredientDraft, RecipeDraft, RecipeInput, RecipeValidationError, StepDraft};
///
/// let input = RecipeInput {
///     title: Some("Tacos".into()),
///     ingredients: Some(vec![IngredientDraft { name: "Tortilla".into(), quantity: String::new() }]),
///     steps: Some(vec![]),
///     ..RecipeInput::default()
/// };
/// assert_eq!(RecipeDraft::try_from(input).unwrap_err(), RecipeValidationError::MissingSteps);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: RecipeTitle,
    pub description: Option<String>,
    pub image_url: String,
    pub prep_time: Option<String>,
    pub servings: Option<i32>,
    pub ingredients: Vec<IngredientDraft>,
    pub steps: Vec<StepDraft>,
    pub group_ids: Vec<GroupId>,
}

impl TryFrom<RecipeInput> for RecipeDraft {
    type Error = RecipeValidationError;

    fn try_from(value: RecipeInput) -> Result<Self, Self::Error> {
        let title = RecipeTitle::new(value.title.unwrap_or_default())?;
        let mut ingredients = validate_ingredients(value.ingredients)?;
        let mut steps = validate_steps(value.steps)?;
        trim_items(&mut ingredients, &mut steps)?;

        Ok(Self {
            title,
            description: value.description,
            image_url: blank_to_none(value.image_url)
                .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_owned()),
            prep_time: value.prep_time,
            servings: value.servings,
            ingredients,
            steps,
            group_ids: value.group_ids,
        })
    }
}

/// Raw partial update payload; `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatchInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub prep_time: Option<String>,
    pub servings: Option<i32>,
    pub ingredients: Option<Vec<IngredientDraft>>,
    pub steps: Option<Vec<StepDraft>>,
    pub group_ids: Option<Vec<GroupId>>,
}

/// Validated partial update.
///
/// Supplied ingredient or step lists replace the stored ones wholesale and
/// must not be empty. `group_ids: Some(vec![])` clears every membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatch {
    pub title: Option<RecipeTitle>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub prep_time: Option<String>,
    pub servings: Option<i32>,
    pub ingredients: Option<Vec<IngredientDraft>>,
    pub steps: Option<Vec<StepDraft>>,
    pub group_ids: Option<Vec<GroupId>>,
}

impl TryFrom<RecipePatchInput> for RecipePatch {
    type Error = RecipeValidationError;

    fn try_from(value: RecipePatchInput) -> Result<Self, Self::Error> {
        let title = value.title.map(RecipeTitle::new).transpose()?;
        let mut ingredients = value
            .ingredients
            .map(|items| validate_ingredients(Some(items)))
            .transpose()?;
        let mut steps = value
            .steps
            .map(|items| validate_steps(Some(items)))
            .transpose()?;
        trim_items(
            ingredients.as_deref_mut().unwrap_or_default(),
            steps.as_deref_mut().unwrap_or_default(),
        )?;

        Ok(Self {
            title,
            description: value.description,
            image_url: value.image_url,
            prep_time: value.prep_time,
            servings: value.servings,
            ingredients,
            steps,
            group_ids: value.group_ids,
        })
    }
}

/// Recipe row without its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: RecipeTitle,
    pub description: Option<String>,
    pub image_url: String,
    pub prep_time: Option<String>,
    pub servings: Option<i32>,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Build a new recipe row from a validated draft.
    pub fn from_draft(draft: &RecipeDraft, owner_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: RecipeId::random(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            image_url: draft.image_url.clone(),
            prep_time: draft.prep_time.clone(),
            servings: draft.servings,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner_id == *user
    }

    /// Apply the scalar fields of a patch. Child lists are handled by the
    /// caller because they touch other tables.
    pub fn apply_fields(&mut self, patch: &RecipePatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url = image_url.clone();
        }
        if let Some(prep_time) = &patch.prep_time {
            self.prep_time = Some(prep_time.clone());
        }
        if let Some(servings) = patch.servings {
            self.servings = Some(servings);
        }
        self.updated_at = now;
    }
}

/// A recipe with everything a client renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeAggregate {
    pub recipe: Recipe,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    pub groups: Vec<Group>,
    pub owner: OwnerSummary,
}

/// Listing filter. `owner` narrows to one author; `title_search` is a
/// case-insensitive substring match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub owner: Option<UserId>,
    pub title_search: Option<String>,
}

impl RecipeFilter {
    /// Build the filter for a listing request. "Mine" only applies to an
    /// authenticated caller; anonymous callers see everything.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::{Caller, RecipeFilter};
    ///
    /// let filter = RecipeFilter::for_caller(&Caller::Anonymous, true, Some("  ".into()));
    /// assert_eq!(filter, RecipeFilter::default());
    /// ```
    pub fn for_caller(caller: &Caller, mine: bool, search: Option<String>) -> Self {
        Self {
            owner: if mine { caller.user_id().copied() } else { None },
            title_search: blank_to_none(search),
        }
    }

    /// True when `title` contains the search text, ignoring case.
    pub fn matches_title(&self, title: &RecipeTitle) -> bool {
        self.title_search.as_ref().is_none_or(|needle| {
            title
                .as_ref()
                .to_lowercase()
                .contains(&needle.to_lowercase())
        })
    }
}

/// Raised when an aggregate references an owner that was not loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingOwner(pub RecipeId);

impl fmt::Display for MissingOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner of recipe {} was not loaded", self.0)
    }
}

impl std::error::Error for MissingOwner {}

/// Flat rows loaded by a store, stitched into aggregates by [`Self::assemble`].
#[derive(Debug, Default)]
pub struct AggregateParts {
    pub recipes: Vec<Recipe>,
    pub ingredients: Vec<(RecipeId, Ingredient)>,
    pub steps: Vec<(RecipeId, Step)>,
    pub memberships: Vec<(RecipeId, Group)>,
    pub owners: Vec<OwnerSummary>,
}

impl AggregateParts {
    /// Group children under their recipe, order them by position and keep
    /// the recipes in the order they were loaded.
    pub fn assemble(self) -> Result<Vec<RecipeAggregate>, MissingOwner> {
        let owners: HashMap<UserId, OwnerSummary> = self
            .owners
            .into_iter()
            .map(|owner| (owner.id, owner))
            .collect();
        let mut ingredients = bucket(self.ingredients);
        let mut steps = bucket(self.steps);
        let mut groups = bucket(self.memberships);

        self.recipes
            .into_iter()
            .map(|recipe| {
                let owner = owners
                    .get(&recipe.owner_id)
                    .cloned()
                    .ok_or(MissingOwner(recipe.id))?;
                let mut recipe_ingredients = ingredients.remove(&recipe.id).unwrap_or_default();
                recipe_ingredients.sort_by_key(|ingredient| ingredient.position);
                let mut recipe_steps = steps.remove(&recipe.id).unwrap_or_default();
                recipe_steps.sort_by_key(|step| step.position);
                let mut recipe_groups = groups.remove(&recipe.id).unwrap_or_default();
                recipe_groups.sort_by(|a, b| a.name.as_ref().cmp(b.name.as_ref()));

                Ok(RecipeAggregate {
                    recipe,
                    ingredients: recipe_ingredients,
                    steps: recipe_steps,
                    groups: recipe_groups,
                    owner,
                })
            })
            .collect()
    }
}

fn bucket<T>(rows: Vec<(RecipeId, T)>) -> HashMap<RecipeId, Vec<T>> {
    let mut map: HashMap<RecipeId, Vec<T>> = HashMap::new();
    for (recipe_id, row) in rows {
        map.entry(recipe_id).or_default().push(row);
    }
    map
}

#[cfg(test)]
#[path = "recipe_tests.rs"]
mod tests;
