//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`) are called by inbound adapters.
//! Driven ports (stores, hashers, token issuers) are implemented by outbound
//! adapters and consumed by domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod group_command;
mod group_query;
mod group_store;
mod identity_command;
mod identity_query;
mod identity_store;
mod password_hasher;
mod recipe_book_store;
mod recipe_command;
mod recipe_query;
mod recipe_store;
mod token_issuer;

#[cfg(test)]
pub use group_command::MockGroupCommand;
pub use group_command::{FixtureGroupCommand, GroupCommand};
#[cfg(test)]
pub use group_query::MockGroupQuery;
pub use group_query::{FixtureGroupQuery, GroupQuery};
pub use group_store::GroupStore;
#[cfg(test)]
pub use identity_command::MockIdentityCommand;
pub use identity_command::{FixtureIdentityCommand, IdentityCommand};
#[cfg(test)]
pub(crate) use identity_command::{FIXTURE_TOKEN, FIXTURE_USER_ID};
#[cfg(test)]
pub use identity_query::MockIdentityQuery;
pub use identity_query::{FixtureIdentityQuery, IdentityQuery};
pub use identity_store::{IdentityCollision, IdentityStore, StoredCredentials};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use recipe_book_store::MockRecipeBookStore;
pub use recipe_book_store::{RecipeBookStore, RecipeBookStoreError, RecipeBookTransaction};
#[cfg(test)]
pub use recipe_command::MockRecipeCommand;
pub use recipe_command::{FixtureRecipeCommand, RecipeCommand};
#[cfg(test)]
pub use recipe_query::MockRecipeQuery;
pub use recipe_query::{FixtureRecipeQuery, RecipeListRequest, RecipeQuery};
pub use recipe_store::RecipeStore;
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenClaims, TokenIssuer, TokenIssuerError};
