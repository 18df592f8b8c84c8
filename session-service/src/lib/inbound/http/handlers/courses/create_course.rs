use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use crate::domain::course::models::CourseTitle;
use crate::domain::course::models::CourseView;
use crate::domain::course::models::CreateCourseCommand;
use crate::domain::identity::models::AuthenticatedIdentity;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

/// The caller becomes the owning teacher.
pub async fn create_course(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedIdentity>,
    Json(body): Json<CreateCourseRequest>,
) -> Result<ApiSuccess<CourseView>, ApiError> {
    let title = CourseTitle::new(body.title)
        .map_err(|e| ApiError::UnprocessableEntity(format!("Invalid title: {}", e)))?;

    state
        .course_service
        .create_course(
            &caller,
            CreateCourseCommand {
                title,
                description: body.description,
            },
        )
        .await
        .map_err(ApiError::from)
        .map(|ref course| ApiSuccess::new(StatusCode::CREATED, course.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateCourseRequest {
    title: String,
    description: Option<String>,
}
