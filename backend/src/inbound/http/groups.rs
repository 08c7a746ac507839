//! Group HTTP handlers. Every route needs a signed-in caller.
//!
//! ```text
//! POST   /api/v1/groups        {"name":"Weeknight dinners"}
//! GET    /api/v1/groups
//! PUT    /api/v1/groups/{id}   {"name":"Sunday roasts"}
//! DELETE /api/v1/groups/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Group, GroupDeletion, GroupId, GroupName, GroupSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::CallerContext;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_group_id};

const GROUP_ID: FieldName = FieldName::new("id");

#[derive(Debug, Deserialize)]
pub struct GroupPath {
    id: String,
}

/// Name payload shared by create and rename.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupRequest {
    #[schema(example = "Weeknight dinners")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    /// Owner of the group.
    pub user_id: String,
    pub created_at: String,
}

impl From<Group> for GroupResponse {
    fn from(value: Group) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.as_ref().to_owned(),
            user_id: value.owner_id.to_string(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Listing entry: the group plus how many recipes it holds.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummaryResponse {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub recipe_count: u64,
    pub created_at: String,
}

impl From<GroupSummary> for GroupSummaryResponse {
    fn from(value: GroupSummary) -> Self {
        let GroupResponse {
            id,
            name,
            user_id,
            created_at,
        } = value.group.into();
        Self {
            id,
            name,
            user_id,
            recipe_count: value.recipe_count,
            created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupDeletionResponse {
    pub message: String,
    /// Recipes removed together with the group.
    pub deleted_recipes_count: u64,
}

impl From<GroupDeletion> for GroupDeletionResponse {
    fn from(value: GroupDeletion) -> Self {
        Self {
            message: "Group and its recipes deleted".to_owned(),
            deleted_recipes_count: value.deleted_recipe_count,
        }
    }
}

fn parse_name(payload: GroupRequest) -> Result<GroupName, Error> {
    GroupName::new(payload.name).map_err(field_error)
}

fn parse_path(path: &GroupPath) -> Result<GroupId, Error> {
    parse_group_id(&path.id, GROUP_ID)
}

/// Create a group owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/groups",
    request_body = GroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "createGroup"
)]
#[post("/groups")]
pub async fn create_group(
    state: web::Data<HttpState>,
    caller: CallerContext,
    payload: web::Json<GroupRequest>,
) -> ApiResult<HttpResponse> {
    let caller = caller.required()?;
    let name = parse_name(payload.into_inner())?;
    let group = state.groups.create_group(&caller, name).await?;
    Ok(HttpResponse::Created().json(GroupResponse::from(group)))
}

/// List the caller's groups by name with their recipe counts.
#[utoipa::path(
    get,
    path = "/api/v1/groups",
    responses(
        (status = 200, description = "Groups", body = [GroupSummaryResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "listGroups"
)]
#[get("/groups")]
pub async fn list_groups(
    state: web::Data<HttpState>,
    caller: CallerContext,
) -> ApiResult<web::Json<Vec<GroupSummaryResponse>>> {
    let caller = caller.required()?;
    let groups = state.groups_query.list_groups(&caller).await?;
    Ok(web::Json(groups.into_iter().map(Into::into).collect()))
}

/// Rename a group the caller owns.
#[utoipa::path(
    put,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, description = "Group identifier")),
    request_body = GroupRequest,
    responses(
        (status = 200, description = "Group renamed", body = GroupResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Group not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "renameGroup"
)]
#[put("/groups/{id}")]
pub async fn rename_group(
    state: web::Data<HttpState>,
    caller: CallerContext,
    path: web::Path<GroupPath>,
    payload: web::Json<GroupRequest>,
) -> ApiResult<web::Json<GroupResponse>> {
    let caller = caller.required()?;
    let id = parse_path(&path)?;
    let group = state
        .groups
        .rename_group(&caller, &id, payload.into_inner().name)
        .await?;
    Ok(web::Json(group.into()))
}

/// Delete a group and every recipe linked to it.
///
/// Recipes that also belong to other groups are deleted as well.
#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, description = "Group identifier")),
    responses(
        (status = 200, description = "Group deleted", body = GroupDeletionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Group not found", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["groups"],
    operation_id = "deleteGroup"
)]
#[delete("/groups/{id}")]
pub async fn delete_group(
    state: web::Data<HttpState>,
    caller: CallerContext,
    path: web::Path<GroupPath>,
) -> ApiResult<web::Json<GroupDeletionResponse>> {
    let caller = caller.required()?;
    let id = parse_path(&path)?;
    let deletion = state.groups.delete_group(&caller, &id).await?;
    Ok(web::Json(deletion.into()))
}

#[cfg(test)]
#[path = "groups_tests.rs"]
mod tests;
