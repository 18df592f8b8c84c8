use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::parse_course_id;
use crate::domain::course::models::Enrollment;
use crate::domain::identity::models::AuthenticatedIdentity;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Enroll the caller in a course.
pub async fn enroll(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedIdentity>,
    Json(body): Json<EnrollmentRequest>,
) -> Result<ApiSuccess<EnrollmentData>, ApiError> {
    let id = parse_course_id(&body.course_id)?;

    state
        .course_service
        .enroll(&id, &caller.user_id)
        .await
        .map_err(ApiError::from)
        .map(|ref enrollment| ApiSuccess::new(StatusCode::CREATED, enrollment.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnrollmentRequest {
    pub(super) course_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentData {
    pub course_id: String,
    pub student_id: String,
    pub active: bool,
    pub enrolled_at: DateTime<Utc>,
}

impl From<&Enrollment> for EnrollmentData {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            course_id: enrollment.course_id.to_string(),
            student_id: enrollment.student_id.to_string(),
            active: enrollment.active,
            enrolled_at: enrollment.enrolled_at,
        }
    }
}
