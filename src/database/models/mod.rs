pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;

pub use ingredient::{Ingredient, IngredientFields};
pub use recipe::{Recipe, RecipeChanges, RecipeFields};
pub use tag::{Tag, TagFields};
pub use user::{NewUser, User, UserChanges, UserId};
