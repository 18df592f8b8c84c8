pub mod get_user;
pub mod set_active;

pub use get_user::get_user;
pub use set_active::set_active;

use crate::domain::identity::models::UserId;
use crate::inbound::http::handlers::ApiError;

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    UserId::from_string(raw).map_err(|_| ApiError::NotFound(format!("Identity not found: {}", raw)))
}
