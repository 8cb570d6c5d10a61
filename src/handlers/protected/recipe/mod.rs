pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod utils;

// Re-export handler functions for use in routing
pub use tag::create as tag_create;
pub use tag::list as tag_list;

pub use ingredient::create as ingredient_create;
pub use ingredient::list as ingredient_list;

pub use recipe::create as recipe_create;
pub use recipe::delete as recipe_delete;
pub use recipe::get as recipe_get;
pub use recipe::list as recipe_list;
pub use recipe::patch as recipe_patch;
pub use recipe::put as recipe_put;
pub use recipe::upload_image as recipe_upload_image;
