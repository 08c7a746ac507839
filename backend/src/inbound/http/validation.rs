//! Shared validation helpers for inbound HTTP adapters.
//!
//! Path segments and id lists arrive as raw strings; these helpers turn them
//! into typed identifiers or a `400` with `{field, value, code}` details.

use serde_json::json;

use crate::domain::{Error, FieldViolation, GroupId, RecipeId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code.as_str(),
        }))
    }

    fn with_index(self, code: ErrorCode, index: usize, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "index": index,
            "value": value,
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("missing required field: {name}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("{name} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn invalid_uuid_index_error(field: FieldName, index: usize, value: &str) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("{name} must contain valid UUIDs")).with_index(
        ErrorCode::InvalidUuid,
        index,
        value,
    )
}

pub(crate) fn parse_recipe_id(value: &str, field: FieldName) -> Result<RecipeId, Error> {
    RecipeId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_group_id(value: &str, field: FieldName) -> Result<GroupId, Error> {
    GroupId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_group_ids(values: Vec<String>, field: FieldName) -> Result<Vec<GroupId>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            GroupId::new(value).map_err(|_| invalid_uuid_index_error(field, index, value))
        })
        .collect()
}

/// Lift a domain constructor failure into a `400` naming the field.
pub(crate) fn field_error(violation: impl FieldViolation) -> Error {
    Error::invalid_field(&violation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;
    use serde_json::Value;

    const RECIPE_ID: FieldName = FieldName::new("id");
    const GROUP_IDS: FieldName = FieldName::new("groupIds");

    fn details(error: &Error) -> &Value {
        error.details().expect("details present")
    }

    #[rstest]
    fn malformed_path_id_names_field_and_value() {
        let err = parse_recipe_id("not-a-uuid", RECIPE_ID).expect_err("invalid id");

        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(details(&err)["field"], "id");
        assert_eq!(details(&err)["value"], "not-a-uuid");
        assert_eq!(details(&err)["code"], "invalid_uuid");
    }

    #[rstest]
    fn well_formed_path_id_parses() {
        let id = parse_group_id("3fa85f64-5717-4562-b3fc-2c963f66afa6", FieldName::new("groupId"))
            .expect("valid id");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    fn group_id_list_reports_the_offending_index() {
        let err = parse_group_ids(
            vec![
                "3fa85f64-5717-4562-b3fc-2c963f66afa6".to_owned(),
                "bogus".to_owned(),
            ],
            GROUP_IDS,
        )
        .expect_err("second entry invalid");

        assert_eq!(details(&err)["field"], "groupIds");
        assert_eq!(details(&err)["index"], 1);
        assert_eq!(details(&err)["value"], "bogus");
    }

    #[rstest]
    fn missing_field_uses_missing_field_code() {
        let err = missing_field_error(GROUP_IDS);
        assert_eq!(err.message(), "missing required field: groupIds");
        assert_eq!(details(&err)["code"], "missing_field");
    }
}
