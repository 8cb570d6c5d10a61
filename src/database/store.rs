use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{Ingredient, NewUser, Recipe, RecipeChanges, Tag, User, UserChanges, UserId};
use crate::access::OwnedEntity;
use crate::filter::Filter;

/// Row storage for one owned entity kind.
///
/// Stores know nothing about identities: scoping to an owner is expressed by the
/// caller as a condition on `user_id` inside the filter.
#[async_trait]
pub trait EntityStore<E: OwnedEntity>: Send + Sync {
    async fn filter(&self, filter: &Filter) -> Result<Vec<E>, DatabaseError>;

    async fn insert(&self, owner: UserId, fields: E::Fields) -> Result<E, DatabaseError>;
}

#[async_trait]
pub trait RecipeStore: EntityStore<Recipe> {
    /// Link lists in `changes` replace the stored sets in the same transaction
    async fn update_recipe(&self, id: i64, changes: RecipeChanges) -> Result<Recipe, DatabaseError>;

    async fn delete_recipe(&self, id: i64) -> Result<(), DatabaseError>;

    async fn set_recipe_image(&self, id: i64, image: Option<String>) -> Result<Recipe, DatabaseError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `DatabaseError::Conflict("email")` when the address is taken
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, DatabaseError>;

    /// Removes the user with every tag, ingredient and recipe they own
    async fn delete_user(&self, id: UserId) -> Result<(), DatabaseError>;
}

/// Everything the HTTP layer needs from a backend
#[async_trait]
pub trait Store: UserStore + EntityStore<Tag> + EntityStore<Ingredient> + RecipeStore {
    async fn ping(&self) -> Result<(), DatabaseError>;
}
