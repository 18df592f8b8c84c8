use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::parse_course_id;
use crate::domain::course::models::CourseView;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<CourseView>, ApiError> {
    let id = parse_course_id(&id)?;

    state
        .course_service
        .get_course(&id)
        .await
        .map_err(ApiError::from)
        .map(|ref course| ApiSuccess::new(StatusCode::OK, course.into()))
}
