use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::parse_course_id;
use crate::domain::course::models::CourseTitle;
use crate::domain::course::models::CourseView;
use crate::domain::course::models::UpdateCourseCommand;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCourseRequest>,
) -> Result<ApiSuccess<CourseView>, ApiError> {
    let id = parse_course_id(&id)?;
    let title = body
        .title
        .map(CourseTitle::new)
        .transpose()
        .map_err(|e| ApiError::UnprocessableEntity(format!("Invalid title: {}", e)))?;

    state
        .course_service
        .update_course(
            &id,
            UpdateCourseCommand {
                title,
                description: body.description,
            },
        )
        .await
        .map_err(ApiError::from)
        .map(|ref course| ApiSuccess::new(StatusCode::OK, course.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateCourseRequest {
    title: Option<String>,
    description: Option<String>,
}
