//! Recipe groups: named, user-owned collections of recipes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::FieldViolation;
use super::identifier::uuid_identifier;
use super::user::UserId;

uuid_identifier! {
    /// Stable group identifier stored as a UUID.
    GroupId
}

/// Validation errors raised by group constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupValidationError {
    EmptyName,
}

impl fmt::Display for GroupValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "group name is required"),
        }
    }
}

impl std::error::Error for GroupValidationError {}

impl FieldViolation for GroupValidationError {
    fn field(&self) -> &'static str {
        "name"
    }

    fn code(&self) -> &'static str {
        "empty_group_name"
    }
}

/// Trimmed, non-empty group name.
///
/// # Examples
/// ```
/// use recipe_backend::domain::GroupName;
///
/// assert_eq!(GroupName::new("  Dinners ").unwrap().as_ref(), "Dinners");
/// assert!(GroupName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupName(String);

impl GroupName {
    pub fn new(name: impl AsRef<str>) -> Result<Self, GroupValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GroupValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for GroupName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<GroupName> for String {
    fn from(value: GroupName) -> Self {
        value.0
    }
}

impl TryFrom<String> for GroupName {
    type Error = GroupValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A named collection owned by one user. Membership is unordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: GroupName,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner_id == *user
    }
}

/// Group listing row annotated with the number of linked recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub group: Group,
    pub recipe_count: u64,
}

/// Outcome of the destructive group delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDeletion {
    pub deleted_recipe_count: u64,
}
