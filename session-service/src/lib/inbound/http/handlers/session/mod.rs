pub mod change_password;
pub mod check;
pub mod forgot_password;
pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;
pub mod register;
pub mod reset_password;

pub use change_password::change_password;
pub use check::check;
pub use forgot_password::forgot_password;
pub use login::login;
pub use logout::logout;
pub use me::me;
pub use refresh::refresh;
pub use register::register;
pub use reset_password::reset_password;

use serde::Serialize;

use crate::domain::identity::models::SessionTokens;

/// Token pair as returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

impl From<SessionTokens> for TokenData {
    fn from(tokens: SessionTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.expires_in,
        }
    }
}
