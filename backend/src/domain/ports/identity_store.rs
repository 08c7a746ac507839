//! Identity rows as seen from inside a recipe book transaction.

use async_trait::async_trait;

use crate::domain::{EmailAddress, User, UserId, Username};

use super::recipe_book_store::RecipeBookStoreError;

/// A user together with the stored password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Which of the probed identity fields are already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityCollision {
    pub username: bool,
    pub email: bool,
}

/// User persistence operations.
#[async_trait]
pub trait IdentityStore: Send {
    /// Load a user by id.
    async fn find_user(&mut self, id: &UserId) -> Result<Option<User>, RecipeBookStoreError>;

    /// Load a user and password hash by exact email.
    async fn find_credentials(
        &mut self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, RecipeBookStoreError>;

    /// Check whether `username` or `email` belongs to a user other than
    /// `excluding`, in a single round trip. Absent probes never collide.
    async fn find_identity_collision(
        &mut self,
        username: Option<&Username>,
        email: Option<&EmailAddress>,
        excluding: Option<&UserId>,
    ) -> Result<Option<IdentityCollision>, RecipeBookStoreError>;

    async fn insert_user(
        &mut self,
        user: &User,
        password_hash: &str,
    ) -> Result<(), RecipeBookStoreError>;

    /// Persist the username and email of an existing user.
    async fn update_user(&mut self, user: &User) -> Result<(), RecipeBookStoreError>;

    /// Delete the user row only; dependants are removed by the caller first.
    async fn delete_user(&mut self, id: &UserId) -> Result<(), RecipeBookStoreError>;
}
