//! Authentication primitives: registration, login credentials and profile
//! updates.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::error::FieldViolation;
use super::user::{EmailAddress, User, UserValidationError, Username};

/// Minimum allowed password length, in characters.
pub const PASSWORD_MIN: usize = 6;

/// Validation errors raised while building authentication payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// A required field was missing or blank.
    MissingField { field: &'static str },
    /// Password shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// Username or email failed its format check.
    User(UserValidationError),
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "{field} is required"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::User(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for AuthValidationError {}

impl FieldViolation for AuthValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } => field,
            Self::PasswordTooShort { .. } => "password",
            Self::User(err) => err.field(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::PasswordTooShort { .. } => "password_too_short",
            Self::User(err) => err.code(),
        }
    }
}

impl From<UserValidationError> for AuthValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

/// Plaintext password held in zeroizing storage.
///
/// Whitespace is preserved to avoid surprising credential comparisons.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a password without applying the registration length policy.
    pub fn new(password: &str) -> Self {
        Self(Zeroizing::new(password.to_owned()))
    }

    /// Password text supplied by the caller.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, AuthValidationError> {
    if value.trim().is_empty() {
        Err(AuthValidationError::MissingField { field })
    } else {
        Ok(value)
    }
}

/// Validated sign-up payload.
///
/// Checks run in a fixed order: every field present, username length,
/// password length, email shape.
///
/// # Examples
/// ```
/// use recipe_backend::domain::{AuthValidationError, Registration};
///
/// let ok = Registration::try_from_parts("ana", "ana@example.com", "secret1");
/// assert!(ok.is_ok());
///
/// let err = Registration::try_from_parts("ana", "ana@example.com", "short").unwrap_err();
/// assert_eq!(err, AuthValidationError::PasswordTooShort { min: 6 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    email: EmailAddress,
    password: Password,
}

impl Registration {
    /// Validate raw registration inputs.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, AuthValidationError> {
        let username = required(username, "username")?;
        let email = required(email, "email")?;
        let password = required(password, "password")?;

        let username = Username::new(username)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(AuthValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let email = EmailAddress::new(email)?;

        Ok(Self {
            username,
            email,
            password: Password::new(password),
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed and non-empty. Its shape is not checked, so an
///   unknown or malformed address fails as invalid credentials.
/// - `password` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = required(email, "email")?.trim();
        if password.is_empty() {
            return Err(AuthValidationError::MissingField { field: "password" });
        }
        Ok(Self {
            email: email.to_owned(),
            password: Password::new(password),
        })
    }

    /// Email string suitable for user lookups.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Partial profile update. Empty inputs count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: Option<Username>,
    pub email: Option<EmailAddress>,
}

impl ProfileUpdate {
    /// Validate optional raw inputs.
    pub fn try_from_parts(
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Self, AuthValidationError> {
        let username = username
            .filter(|value| !value.is_empty())
            .map(Username::new)
            .transpose()?;
        let email = email
            .filter(|value| !value.is_empty())
            .map(EmailAddress::new)
            .transpose()?;
        Ok(Self { username, email })
    }

    /// True when neither field is supplied.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

/// Signed bearer token handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Result of a successful registration or login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: AuthToken,
    pub user: User,
}
