//! OpenAPI document for the recipe book API.
//!
//! Handlers carry their own `#[utoipa::path]` annotations; [`ApiDoc`] only
//! gathers them, registers the payload schemas and declares the bearer
//! token scheme. Swagger UI serves it in debug builds and the
//! `openapi-dump` binary prints it for tooling.

use crate::inbound::http::auth::{
    AuthResponse, LoginRequest, ProfileRequest, ProfileResponse, RegisterRequest,
};
use crate::inbound::http::dto::{MessageResponse, UserResponse};
use crate::inbound::http::groups::{
    GroupDeletionResponse, GroupRequest, GroupResponse, GroupSummaryResponse,
};
use crate::inbound::http::recipes_dto::{
    AttachGroupsRequest, AttachGroupsResponse, IngredientRequest, IngredientResponse,
    OwnerResponse, RecipeGroupResponse, RecipeRequest, RecipeResponse, StepRequest, StepResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the security scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "BearerToken";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some(
                        "Token returned by POST /api/v1/auth/register or /api/v1/auth/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recipe book API",
        description = "Accounts, recipe groups and recipes with ordered ingredients and steps."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::get_profile,
        crate::inbound::http::auth::update_profile,
        crate::inbound::http::auth::delete_account,
        crate::inbound::http::groups::create_group,
        crate::inbound::http::groups::list_groups,
        crate::inbound::http::groups::rename_group,
        crate::inbound::http::groups::delete_group,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::recipes::attach_to_groups,
        crate::inbound::http::recipes::detach_from_group,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        MessageResponse,
        UserResponse,
        RegisterRequest,
        LoginRequest,
        ProfileRequest,
        AuthResponse,
        ProfileResponse,
        GroupRequest,
        GroupResponse,
        GroupSummaryResponse,
        GroupDeletionResponse,
        RecipeRequest,
        IngredientRequest,
        StepRequest,
        AttachGroupsRequest,
        AttachGroupsResponse,
        RecipeResponse,
        IngredientResponse,
        StepResponse,
        RecipeGroupResponse,
        OwnerResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login and the caller's profile"),
        (name = "groups", description = "Recipe groups owned by the caller"),
        (name = "recipes", description = "Recipes and their group links"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
