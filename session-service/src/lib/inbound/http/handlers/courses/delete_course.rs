use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::parse_course_id;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::MessageData;
use crate::inbound::http::router::AppState;

pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let id = parse_course_id(&id)?;
    state.course_service.delete_course(&id).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageData::new("Course deleted"),
    ))
}
