//! Bearer-token caller resolution for HTTP handlers.
//!
//! Handlers never parse `Authorization` themselves. They take a
//! [`CallerContext`] and decide whether the route needs a signed-in caller
//! ([`CallerContext::required`]) or tolerates an anonymous one
//! ([`CallerContext::optional`]).

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Caller, Error, ErrorCode};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Caller resolved from the request, plus the reason it was rejected if the
/// presented token did not verify.
#[derive(Debug, Clone)]
pub struct CallerContext {
    caller: Caller,
    rejection: Option<Error>,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self {
            caller: Caller::Anonymous,
            rejection: None,
        }
    }

    pub fn authenticated(caller: Caller) -> Self {
        Self {
            caller,
            rejection: None,
        }
    }

    fn rejected(error: Error) -> Self {
        Self {
            caller: Caller::Anonymous,
            rejection: Some(error),
        }
    }

    /// The caller for a route that needs a signed-in user.
    ///
    /// Fails with `401` when no token was sent or the token did not verify.
    pub fn required(&self) -> Result<Caller, Error> {
        if let Some(error) = &self.rejection {
            return Err(error.clone());
        }
        self.caller.require_user()?;
        Ok(self.caller)
    }

    /// The caller for a route open to everyone; a bad token reads as
    /// anonymous.
    pub fn optional(&self) -> Caller {
        self.caller
    }
}

enum Credential<'a> {
    Absent,
    Malformed,
    Bearer(&'a str),
}

fn bearer_credential(headers: &HeaderMap) -> Credential<'_> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Credential::Absent;
    };
    match value.to_str().ok().and_then(|raw| raw.strip_prefix(BEARER_PREFIX)) {
        Some(token) if !token.trim().is_empty() => Credential::Bearer(token.trim()),
        _ => Credential::Malformed,
    }
}

async fn resolve(
    state: Option<web::Data<HttpState>>,
    token: Option<String>,
) -> Result<CallerContext, Error> {
    let Some(token) = token else {
        return Ok(CallerContext::rejected(Error::unauthorized(
            "authorization header must carry a bearer token",
        )));
    };
    let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    match state.identity_query.resolve_caller(&token).await {
        Ok(caller) => Ok(CallerContext::authenticated(caller)),
        Err(error) if error.code() == ErrorCode::Unauthorized => {
            warn!(reason = error.message(), "bearer token rejected");
            Ok(CallerContext::rejected(error))
        }
        Err(error) => Err(error),
    }
}

impl FromRequest for CallerContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = match bearer_credential(req.headers()) {
            Credential::Absent => return Box::pin(async { Ok(CallerContext::anonymous()) }),
            Credential::Malformed => None,
            Credential::Bearer(token) => Some(token.to_owned()),
        };
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move { resolve(state, token).await.map_err(actix_web::Error::from) })
    }
}
