pub mod create_course;
pub mod delete_course;
pub mod enroll;
pub mod get_course;
pub mod list_courses;
pub mod roster;
pub mod update_course;
pub mod withdraw;

pub use create_course::create_course;
pub use delete_course::delete_course;
pub use enroll::enroll;
pub use get_course::get_course;
pub use list_courses::list_courses;
pub use roster::roster;
pub use update_course::update_course;
pub use withdraw::withdraw;

use crate::domain::course::models::CourseId;
use crate::inbound::http::handlers::ApiError;

fn parse_course_id(raw: &str) -> Result<CourseId, ApiError> {
    CourseId::from_string(raw).map_err(|_| ApiError::NotFound(format!("Course not found: {}", raw)))
}
