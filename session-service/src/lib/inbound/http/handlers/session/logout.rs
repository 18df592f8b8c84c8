use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use crate::domain::identity::models::AuthenticatedIdentity;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::MessageData;
use crate::inbound::http::router::AppState;

pub async fn logout(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedIdentity>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state.session_service.logout(&caller.user_id).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new("Logged out"),
    ))
}
