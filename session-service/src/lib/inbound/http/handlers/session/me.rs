use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use crate::domain::identity::models::AuthenticatedIdentity;
use crate::domain::identity::models::PublicIdentity;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedIdentity>,
) -> Result<ApiSuccess<PublicIdentity>, ApiError> {
    state
        .session_service
        .current_identity(&caller.user_id)
        .await
        .map_err(ApiError::from)
        .map(|identity| ApiSuccess::new(StatusCode::OK, identity))
}
