use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::domain::identity::models::Password;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::MessageData;
use crate::inbound::http::router::AppState;

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let new_password = Password::new(body.new_password)
        .map_err(|e| ApiError::UnprocessableEntity(format!("Invalid password: {}", e)))?;

    state
        .session_service
        .reset_password(&body.token, new_password)
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new("Password reset"),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResetPasswordRequest {
    token: String,
    new_password: String,
}
