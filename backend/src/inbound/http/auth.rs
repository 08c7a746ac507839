//! Account HTTP handlers.
//!
//! ```text
//! POST   /api/v1/auth/register {"username":"ana","email":"ana@example.com","password":"secret1"}
//! POST   /api/v1/auth/login    {"email":"ana@example.com","password":"secret1"}
//! GET    /api/v1/auth/profile
//! PUT    /api/v1/auth/profile  {"username":"ana_b"}
//! DELETE /api/v1/auth/account
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AuthSession, LoginCredentials, ProfileUpdate, Registration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::CallerContext;
use crate::inbound::http::dto::{MessageResponse, UserResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::field_error;

/// Registration payload. Missing fields read as empty and are rejected.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Partial profile change. Absent or empty fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Signed token plus the account it belongs to.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

impl From<AuthSession> for AuthResponse {
    fn from(value: AuthSession) -> Self {
        Self {
            token: value.token.as_str().to_owned(),
            user: value.user.into(),
        }
    }
}

/// Envelope used by the profile endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
}

/// Create an account and return a token for it.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username or email taken", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let registration =
        Registration::try_from_parts(&username, &email, &password).map_err(field_error)?;
    let session = state.identity.register(registration).await?;
    Ok(HttpResponse::Created().json(AuthResponse::from(session)))
}

/// Exchange credentials for a token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(field_error)?;
    let session = state.identity.login(credentials).await?;
    Ok(web::Json(session.into()))
}

/// Fetch the signed-in account.
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "getProfile"
)]
#[get("/auth/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    caller: CallerContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let caller = caller.required()?;
    let user = state.identity_query.profile(&caller).await?;
    Ok(web::Json(ProfileResponse { user: user.into() }))
}

/// Change the signed-in account's username and/or email.
#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account not found", body = ErrorSchema),
        (status = 409, description = "Username or email taken", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "updateProfile"
)]
#[put("/auth/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: CallerContext,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let caller = caller.required()?;
    let update =
        ProfileUpdate::try_from_parts(payload.username.as_deref(), payload.email.as_deref())
            .map_err(field_error)?;
    let user = state.identity.update_profile(&caller, update).await?;
    Ok(web::Json(ProfileResponse { user: user.into() }))
}

/// Delete the signed-in account with every group and recipe it owns.
#[utoipa::path(
    delete,
    path = "/api/v1/auth/account",
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "deleteAccount"
)]
#[delete("/auth/account")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    caller: CallerContext,
) -> ApiResult<web::Json<MessageResponse>> {
    let caller = caller.required()?;
    state.identity.delete_account(&caller).await?;
    Ok(web::Json(MessageResponse::new("Account deleted")))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
