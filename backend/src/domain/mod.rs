//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed recipe book model and the use-cases
//! that keep it consistent. Types validate on construction and document
//! their invariants and serde contracts in Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Group, Recipe and RecipeAggregate: the persisted model.
//! - Caller: explicit identity passed into every use-case.
//! - ConsistencyService, GroupService, IdentityService and
//!   RecipeQueryService: implementations of the driving ports.

pub mod auth;
pub mod caller;
mod consistency;
pub mod error;
pub mod group;
mod group_service;
mod identifier;
mod identity_service;
pub mod ports;
pub mod recipe;
mod recipe_query_service;
pub mod trace_id;
mod transaction;
pub mod user;

pub use self::auth::{
    AuthSession, AuthToken, AuthValidationError, LoginCredentials, PASSWORD_MIN, Password,
    ProfileUpdate, Registration,
};
pub use self::caller::Caller;
pub use self::consistency::ConsistencyService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, FieldViolation};
pub use self::group::{
    Group, GroupDeletion, GroupId, GroupName, GroupSummary, GroupValidationError,
};
pub use self::group_service::GroupService;
pub use self::identifier::IdentifierError;
pub use self::identity_service::IdentityService;
pub use self::recipe::{
    AggregateParts, DEFAULT_IMAGE_URL, Ingredient, IngredientDraft, MissingOwner, Recipe,
    RecipeAggregate, RecipeDraft, RecipeFilter, RecipeId, RecipeInput, RecipePatch,
    RecipePatchInput, RecipeTitle, RecipeValidationError, Step, StepDraft, position_ingredients,
    position_steps,
};
pub use self::recipe_query_service::RecipeQueryService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, OwnerSummary, USERNAME_MIN, User, UserId, UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use recipe_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
