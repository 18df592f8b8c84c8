use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::parse_user_id;
use crate::domain::identity::models::PublicIdentity;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<PublicIdentity>, ApiError> {
    let user_id = parse_user_id(&user_id)?;

    state
        .session_service
        .current_identity(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|identity| ApiSuccess::new(StatusCode::OK, identity))
}
