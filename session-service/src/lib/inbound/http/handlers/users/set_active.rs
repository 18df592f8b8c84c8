use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::parse_user_id;
use crate::domain::identity::models::PublicIdentity;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Activate or deactivate an account. Deactivation ends its sessions.
pub async fn set_active(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<SetActiveRequest>,
) -> Result<ApiSuccess<PublicIdentity>, ApiError> {
    let user_id = parse_user_id(&user_id)?;

    state
        .session_service
        .set_active(&user_id, body.active)
        .await
        .map_err(ApiError::from)
        .map(|identity| ApiSuccess::new(StatusCode::OK, identity))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetActiveRequest {
    active: bool,
}
