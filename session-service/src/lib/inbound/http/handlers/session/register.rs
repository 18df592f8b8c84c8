use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::identity::errors::DisplayNameError;
use crate::domain::identity::errors::EmailError;
use crate::domain::identity::errors::PasswordPolicyError;
use crate::domain::identity::errors::RoleError;
use crate::domain::identity::models::DisplayName;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Password;
use crate::domain::identity::models::PublicIdentity;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::Role;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Registration does not log the caller in; no tokens are returned.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<PublicIdentity>, ApiError> {
    state
        .session_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|identity| ApiSuccess::new(StatusCode::CREATED, identity))
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    email: String,
    password: String,
    display_name: String,
    role: Option<String>,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterRequestError {
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordPolicyError),

    #[error("Invalid display name: {0}")]
    DisplayName(#[from] DisplayNameError),

    #[error("Invalid role: {0}")]
    Role(#[from] RoleError),
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, ParseRegisterRequestError> {
        let email = EmailAddress::new(self.email)?;
        let password = Password::new(self.password)?;
        let display_name = DisplayName::new(self.display_name)?;
        let role = self.role.map(|role| role.parse::<Role>()).transpose()?;

        Ok(RegisterCommand {
            email,
            password,
            display_name,
            role,
        })
    }
}

impl From<ParseRegisterRequestError> for ApiError {
    fn from(err: ParseRegisterRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
