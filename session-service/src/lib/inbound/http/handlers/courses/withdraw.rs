use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;

use super::enroll::EnrollmentRequest;
use super::parse_course_id;
use crate::domain::identity::models::AuthenticatedIdentity;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::MessageData;
use crate::inbound::http::router::AppState;

/// Withdraw the caller from a course they are enrolled in.
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedIdentity>,
    Json(body): Json<EnrollmentRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let id = parse_course_id(&body.course_id)?;
    state.course_service.withdraw(&id, &caller.user_id).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new("Withdrawn from course"),
    ))
}
