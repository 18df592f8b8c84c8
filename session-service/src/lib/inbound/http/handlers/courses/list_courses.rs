use axum::extract::State;
use axum::http::StatusCode;

use crate::domain::course::models::CourseView;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<CourseView>>, ApiError> {
    let courses = state.course_service.list_courses().await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        courses.iter().map(CourseView::from).collect(),
    ))
}
