use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::parse_course_id;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn roster(
    State(state): State<AppState>,
    Query(query): Query<RosterQuery>,
) -> Result<ApiSuccess<RosterData>, ApiError> {
    let id = parse_course_id(&query.course_id)?;
    let students = state.course_service.roster(&id).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        RosterData {
            course_id: id.to_string(),
            student_ids: students.iter().map(ToString::to_string).collect(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterQuery {
    course_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterData {
    pub course_id: String,
    pub student_ids: Vec<String>,
}
