// handlers/public/mod.rs - Token acquisition and registration, no authentication
pub mod user;

pub use user::create as user_create;
pub use user::token as user_token;
