//! PostgreSQL persistence for the recipe book.
//!
//! - **Thin adapter**: [`DieselRecipeBookStore`] translates between Diesel
//!   rows and domain types; cascades and authorization live in the domain.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//! - **Async pooling**: `bb8` through `diesel-async`, with owned checkouts so
//!   a transaction can hold its connection.
//!
//! # Example
//!
//! ```no_run
//! use recipe_backend::outbound::persistence::{DbPool, DieselRecipeBookStore, PoolConfig};
//!
//! # async fn connect() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/recipes")).await?;
//! let store = DieselRecipeBookStore::new(pool);
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_recipe_book_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_recipe_book_store::DieselRecipeBookStore;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, OwnedConnection, PoolConfig, PoolError};
