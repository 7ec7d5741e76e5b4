pub mod auth;
pub mod response;

pub use auth::{require_authentication, AuthUser};
pub use response::{ApiResponse, ApiResult, Created, Links, Updated};
