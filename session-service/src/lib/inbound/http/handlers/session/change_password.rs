use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use crate::domain::identity::models::AuthenticatedIdentity;
use crate::domain::identity::models::Password;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::MessageData;
use crate::inbound::http::router::AppState;

pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedIdentity>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let new_password = Password::new(body.new_password)
        .map_err(|e| ApiError::UnprocessableEntity(format!("Invalid password: {}", e)))?;

    state
        .session_service
        .change_password(&caller.user_id, &body.current_password, new_password)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new("Password changed"),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}
