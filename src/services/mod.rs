pub mod image_store;
pub mod user_service;

pub use image_store::{ImageError, ImageStorage};
pub use user_service::{UserError, UserService};
