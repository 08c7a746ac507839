//! Diesel and pool error mapping for the recipe book store.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use crate::domain::ports::RecipeBookStoreError;

use super::pool::PoolError;

/// Map pool failures to connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> RecipeBookStoreError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    RecipeBookStoreError::connection(message)
}

/// Domain field guarded by a unique constraint, looked up by constraint name.
fn conflict_field(constraint: Option<&str>, message: &str) -> Option<&'static str> {
    let haystack = constraint.unwrap_or(message);
    [
        ("users_username_key", "username"),
        ("users_email_key", "email"),
        ("recipes_title_key", "title"),
    ]
    .into_iter()
    .find_map(|(name, field)| haystack.contains(name).then_some(field))
}

/// Map Diesel errors to store errors.
///
/// Unique violations on known constraints become [`RecipeBookStoreError::Conflict`]
/// so a race that slips past the in-transaction check still reports the
/// clashing field. Everything else is a query or connection failure.
pub(crate) fn map_diesel_error(error: DieselError) -> RecipeBookStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match conflict_field(info.constraint_name(), info.message()) {
                Some(field) => RecipeBookStoreError::conflict(field),
                None => {
                    warn!(
                        constraint_name = ?info.constraint_name(),
                        "unrecognised unique violation"
                    );
                    RecipeBookStoreError::query("unique constraint violation")
                }
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            RecipeBookStoreError::query("foreign key violation")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RecipeBookStoreError::connection("database connection error")
        }
        DieselError::BrokenTransactionManager => {
            RecipeBookStoreError::connection("transaction manager is broken")
        }
        DieselError::NotFound => RecipeBookStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => RecipeBookStoreError::query("database query error"),
        _ => RecipeBookStoreError::query("database error"),
    }
}
