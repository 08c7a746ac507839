//! Caller identity passed explicitly into every use-case.

use super::error::Error;
use super::user::UserId;

/// Who is invoking an operation.
///
/// Inbound adapters resolve this once per request from a bearer credential;
/// services decide whether an anonymous caller is acceptable.
///
/// # Examples
/// ```
/// use recipe_backend::domain::{Caller, ErrorCode, UserId};
///
/// let id = UserId::random();
/// assert_eq!(Caller::Authenticated(id).require_user().unwrap(), &id);
/// assert_eq!(
///     Caller::Anonymous.require_user().unwrap_err().code(),
///     ErrorCode::Unauthorized
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Caller {
    #[default]
    Anonymous,
    Authenticated(UserId),
}

impl Caller {
    /// The authenticated user id, if any.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(id) => Some(id),
        }
    }

    /// Require an authenticated caller or fail with `Unauthorized`.
    pub fn require_user(&self) -> Result<&UserId, Error> {
        self.user_id()
            .ok_or_else(|| Error::unauthorized("authentication required"))
    }
}
