//! Recipe HTTP handlers.
//!
//! ```text
//! GET    /api/v1/recipes?mine=true&search=taco
//! GET    /api/v1/recipes/{id}
//! POST   /api/v1/recipes
//! PUT    /api/v1/recipes/{id}
//! DELETE /api/v1/recipes/{id}
//! POST   /api/v1/recipes/{id}/groups {"groupIds":["..."]}
//! DELETE /api/v1/recipes/{recipeId}/groups/{groupId}
//! ```
//!
//! Reads are public; the listing honours `mine` only when a valid token is
//! presented. Every write needs a signed-in caller and runs as one
//! transaction inside the domain.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{Error, RecipeId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::CallerContext;
use crate::inbound::http::dto::MessageResponse;
use crate::inbound::http::recipes_dto::{
    AttachGroupsRequest, AttachGroupsResponse, RecipeGroupPath, RecipeListQuery, RecipePath,
    RecipeRequest, RecipeResponse, parse_attach_request, parse_create_request,
    parse_update_request,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_group_id, parse_recipe_id};

fn parse_path(path: &RecipePath) -> Result<RecipeId, Error> {
    parse_recipe_id(&path.id, FieldName::new("id"))
}

/// List recipes ordered by title.
#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Recipes", body = [RecipeResponse]),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes"
)]
#[get("/recipes")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    caller: CallerContext,
    query: web::Query<RecipeListQuery>,
) -> ApiResult<web::Json<Vec<RecipeResponse>>> {
    let recipes = state
        .recipes_query
        .list_recipes(&caller.optional(), query.into_inner().into())
        .await?;
    Ok(web::Json(recipes.into_iter().map(Into::into).collect()))
}

/// Fetch one recipe with its ingredients, steps, groups and owner.
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    params(("id" = String, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Recipe", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Recipe not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe",
    security([])
)]
#[get("/recipes/{id}")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    path: web::Path<RecipePath>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let id = parse_path(&path)?;
    let recipe = state.recipes_query.get_recipe(&id).await?;
    Ok(web::Json(recipe.into()))
}

/// Create a recipe owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Title already in use", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    caller: CallerContext,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let caller = caller.required()?;
    let input = parse_create_request(payload.into_inner())?;
    let recipe = state.recipes.create_recipe(&caller, input).await?;
    Ok(HttpResponse::Created().json(RecipeResponse::from(recipe)))
}

/// Partially update a recipe. Supplied ingredient, step and group lists
/// replace the stored ones.
#[utoipa::path(
    put,
    path = "/api/v1/recipes/{id}",
    params(("id" = String, Path, description = "Recipe identifier")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Recipe not found", body = ErrorSchema),
        (status = 409, description = "Title already in use", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[put("/recipes/{id}")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    caller: CallerContext,
    path: web::Path<RecipePath>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let caller = caller.required()?;
    let id = parse_path(&path)?;
    let patch = parse_update_request(payload.into_inner())?;
    let recipe = state.recipes.update_recipe(&caller, &id, patch).await?;
    Ok(web::Json(recipe.into()))
}

/// Delete a recipe with its ingredients, steps and group links.
#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}",
    params(("id" = String, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Recipe deleted", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Recipe not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id}")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    caller: CallerContext,
    path: web::Path<RecipePath>,
) -> ApiResult<web::Json<MessageResponse>> {
    let caller = caller.required()?;
    let id = parse_path(&path)?;
    state.recipes.delete_recipe(&caller, &id).await?;
    Ok(web::Json(MessageResponse::new("Recipe deleted")))
}

/// Link a recipe to some of the caller's groups. Already-linked groups
/// are left as they are.
#[utoipa::path(
    post,
    path = "/api/v1/recipes/{id}/groups",
    params(("id" = String, Path, description = "Recipe identifier")),
    request_body = AttachGroupsRequest,
    responses(
        (status = 200, description = "Recipe linked", body = AttachGroupsResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Recipe not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "attachRecipeToGroups"
)]
#[post("/recipes/{id}/groups")]
pub async fn attach_to_groups(
    state: web::Data<HttpState>,
    caller: CallerContext,
    path: web::Path<RecipePath>,
    payload: web::Json<AttachGroupsRequest>,
) -> ApiResult<web::Json<AttachGroupsResponse>> {
    let caller = caller.required()?;
    let id = parse_path(&path)?;
    let group_ids = parse_attach_request(payload.into_inner())?;
    let attached = state
        .recipes
        .attach_to_groups(&caller, &id, group_ids)
        .await?;
    Ok(web::Json(AttachGroupsResponse::new(attached)))
}

/// Unlink a recipe from one group. Unlinking a pair that is not linked
/// succeeds.
#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{recipeId}/groups/{groupId}",
    params(
        ("recipeId" = String, Path, description = "Recipe identifier"),
        ("groupId" = String, Path, description = "Group identifier")
    ),
    responses(
        (status = 200, description = "Recipe unlinked", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Recipe or group not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "detachRecipeFromGroup"
)]
#[delete("/recipes/{recipeId}/groups/{groupId}")]
pub async fn detach_from_group(
    state: web::Data<HttpState>,
    caller: CallerContext,
    path: web::Path<RecipeGroupPath>,
) -> ApiResult<web::Json<MessageResponse>> {
    let caller = caller.required()?;
    let recipe_id = parse_recipe_id(&path.recipe_id, FieldName::new("recipeId"))?;
    let group_id = parse_group_id(&path.group_id, FieldName::new("groupId"))?;
    state
        .recipes
        .detach_from_group(&caller, &recipe_id, &group_id)
        .await?;
    Ok(web::Json(MessageResponse::new("Recipe removed from group")))
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod tests;
