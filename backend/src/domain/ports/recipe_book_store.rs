//! Transactional entry point to recipe book persistence.
//!
//! Every use-case opens one [`RecipeBookTransaction`], performs all of its
//! reads and writes through it, and then commits or rolls back. Adapters
//! guarantee that nothing written through an uncommitted handle is ever
//! visible to other transactions, including when the handle is dropped.

use async_trait::async_trait;

use super::define_port_error;
use super::group_store::GroupStore;
use super::identity_store::IdentityStore;
use super::recipe_store::RecipeStore;

define_port_error! {
    /// Errors raised by recipe book store adapters.
    pub enum RecipeBookStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "recipe book store connection failed: {message}",
        /// A statement failed while executing.
        Query { message: String } =>
            "recipe book store query failed: {message}",
        /// A uniqueness constraint rejected a write.
        Conflict { field: String } =>
            "recipe book store rejected duplicate {field}",
    }
}

/// One atomic unit of work spanning users, groups and recipes.
#[async_trait]
pub trait RecipeBookTransaction: IdentityStore + GroupStore + RecipeStore + Send {
    /// Make every write in this transaction visible.
    async fn commit(self: Box<Self>) -> Result<(), RecipeBookStoreError>;

    /// Discard every write in this transaction.
    async fn rollback(self: Box<Self>) -> Result<(), RecipeBookStoreError>;
}

/// Port for opening recipe book transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeBookStore: Send + Sync {
    /// Begin a new transaction.
    async fn begin(&self) -> Result<Box<dyn RecipeBookTransaction>, RecipeBookStoreError>;
}
