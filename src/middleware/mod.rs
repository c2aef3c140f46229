pub mod auth;
pub mod response;

pub use auth::{authorize, require_admin, require_boarder, require_landlord, require_session, session_token, Policy};
pub use response::{ApiResponse, ApiResult, Deleted};
