pub mod auth;
pub mod payload;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use payload::JsonPayload;
pub use response::{ApiResponse, ApiResult};
