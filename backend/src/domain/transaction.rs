//! Running one use-case inside one store transaction.

use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::{RecipeBookStore, RecipeBookStoreError, RecipeBookTransaction};

pub(crate) fn map_store_error(error: RecipeBookStoreError) -> Error {
    match error {
        RecipeBookStoreError::Connection { message } => {
            Error::service_unavailable(format!("recipe book store unavailable: {message}"))
        }
        RecipeBookStoreError::Query { message } => {
            Error::internal(format!("recipe book store error: {message}"))
        }
        RecipeBookStoreError::Conflict { field } => Error::field_conflict(field),
    }
}

pub(crate) async fn begin<S>(store: &S) -> Result<Box<dyn RecipeBookTransaction>, Error>
where
    S: RecipeBookStore + ?Sized,
{
    store.begin().await.map_err(map_store_error)
}

/// Commit on success, roll back on failure.
///
/// A failed rollback is logged and the original error is returned; the
/// adapter discards the uncommitted work when the handle is dropped.
pub(crate) async fn finish<T>(
    tx: Box<dyn RecipeBookTransaction>,
    outcome: Result<T, Error>,
) -> Result<T, Error> {
    match outcome {
        Ok(value) => {
            tx.commit().await.map_err(map_store_error)?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = tx.rollback().await {
                warn!(error = %rollback_error, "rollback failed");
            }
            Err(error)
        }
    }
}
