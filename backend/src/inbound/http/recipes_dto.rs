//! Request and response payloads for recipe handlers.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::RecipeListRequest;
use crate::domain::{
    Error, Group, GroupId, Ingredient, IngredientDraft, OwnerSummary, RecipeAggregate, RecipeInput,
    RecipePatchInput, Step, StepDraft,
};
use crate::inbound::http::validation::{FieldName, parse_group_ids};

const GROUP_IDS: FieldName = FieldName::new("groupIds");

#[derive(Debug, Deserialize)]
pub struct RecipePath {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeGroupPath {
    pub recipe_id: String,
    pub group_id: String,
}

/// Query string accepted by the recipe listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    /// Only the caller's recipes. Ignored without a valid token.
    #[serde(default)]
    pub mine: bool,
    /// Case-insensitive title substring.
    pub search: Option<String>,
}

impl From<RecipeListQuery> for RecipeListRequest {
    fn from(value: RecipeListQuery) -> Self {
        Self {
            mine: value.mine,
            search: value.search.filter(|term| !term.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct IngredientRequest {
    #[schema(example = "Tortilla")]
    pub name: String,
    #[schema(example = "4 pieces")]
    pub quantity: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StepRequest {
    #[schema(example = "Warm the tortillas")]
    pub description: String,
}

/// Body for create and update. On update, absent fields are left alone and
/// a supplied list replaces the stored one entirely.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    #[schema(example = "Tacos")]
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[schema(example = "20 min")]
    pub prep_time: Option<String>,
    pub servings: Option<i32>,
    pub ingredients: Option<Vec<IngredientRequest>>,
    pub steps: Option<Vec<StepRequest>>,
    /// Groups to link. Ids that are not the caller's groups are skipped.
    pub group_ids: Option<Vec<String>>,
}

fn ingredient_drafts(items: Option<Vec<IngredientRequest>>) -> Option<Vec<IngredientDraft>> {
    items.map(|items| {
        items
            .into_iter()
            .map(|item| IngredientDraft {
                name: item.name,
                quantity: item.quantity,
            })
            .collect()
    })
}

fn step_drafts(items: Option<Vec<StepRequest>>) -> Option<Vec<StepDraft>> {
    items.map(|items| {
        items
            .into_iter()
            .map(|item| StepDraft {
                description: item.description,
            })
            .collect()
    })
}

pub(crate) fn parse_create_request(payload: RecipeRequest) -> Result<RecipeInput, Error> {
    let group_ids = parse_group_ids(payload.group_ids.unwrap_or_default(), GROUP_IDS)?;
    Ok(RecipeInput {
        title: payload.title,
        description: payload.description,
        image_url: payload.image_url,
        prep_time: payload.prep_time,
        servings: payload.servings,
        ingredients: ingredient_drafts(payload.ingredients),
        steps: step_drafts(payload.steps),
        group_ids,
    })
}

pub(crate) fn parse_update_request(payload: RecipeRequest) -> Result<RecipePatchInput, Error> {
    let group_ids = payload
        .group_ids
        .map(|ids| parse_group_ids(ids, GROUP_IDS))
        .transpose()?;
    Ok(RecipePatchInput {
        title: payload.title,
        description: payload.description,
        image_url: payload.image_url,
        prep_time: payload.prep_time,
        servings: payload.servings,
        ingredients: ingredient_drafts(payload.ingredients),
        steps: step_drafts(payload.steps),
        group_ids,
    })
}

/// Body for `POST /recipes/{id}/groups`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachGroupsRequest {
    pub group_ids: Option<Vec<String>>,
}

pub(crate) fn parse_attach_request(payload: AttachGroupsRequest) -> Result<Vec<GroupId>, Error> {
    parse_group_ids(payload.group_ids.unwrap_or_default(), GROUP_IDS)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachGroupsResponse {
    pub message: String,
    /// Owned groups the recipe is now linked to.
    pub attached_count: u64,
}

impl AttachGroupsResponse {
    pub fn new(attached_count: u64) -> Self {
        Self {
            message: format!("Recipe added to {attached_count} group(s)"),
            attached_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientResponse {
    pub id: String,
    pub name: String,
    pub quantity: String,
    pub position: u32,
}

impl From<Ingredient> for IngredientResponse {
    fn from(value: Ingredient) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            quantity: value.quantity,
            position: value.position,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    pub id: String,
    pub description: String,
    pub position: u32,
}

impl From<Step> for StepResponse {
    fn from(value: Step) -> Self {
        Self {
            id: value.id.to_string(),
            description: value.description,
            position: value.position,
        }
    }
}

/// Group a recipe belongs to, without its own membership data.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeGroupResponse {
    pub id: String,
    pub name: String,
}

impl From<Group> for RecipeGroupResponse {
    fn from(value: Group) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.as_ref().to_owned(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub id: String,
    pub username: String,
}

impl From<OwnerSummary> for OwnerResponse {
    fn from(value: OwnerSummary) -> Self {
        Self {
            id: value.id.to_string(),
            username: value.username.as_ref().to_owned(),
        }
    }
}

/// Full recipe aggregate with ordered children.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub prep_time: Option<String>,
    pub servings: Option<i32>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub ingredients: Vec<IngredientResponse>,
    pub steps: Vec<StepResponse>,
    pub groups: Vec<RecipeGroupResponse>,
    pub owner: OwnerResponse,
}

impl From<RecipeAggregate> for RecipeResponse {
    fn from(value: RecipeAggregate) -> Self {
        let RecipeAggregate {
            recipe,
            ingredients,
            steps,
            groups,
            owner,
        } = value;
        Self {
            id: recipe.id.to_string(),
            title: recipe.title.as_ref().to_owned(),
            description: recipe.description,
            image_url: recipe.image_url,
            prep_time: recipe.prep_time,
            servings: recipe.servings,
            user_id: recipe.owner_id.to_string(),
            created_at: recipe.created_at.to_rfc3339(),
            updated_at: recipe.updated_at.to_rfc3339(),
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            steps: steps.into_iter().map(Into::into).collect(),
            groups: groups.into_iter().map(Into::into).collect(),
            owner: owner.into(),
        }
    }
}
