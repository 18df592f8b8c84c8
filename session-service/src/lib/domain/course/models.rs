use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::course::errors::CourseIdError;
use crate::domain::course::errors::CourseTitleError;
use crate::domain::identity::models::UserId;

/// Course record; the owning teacher is the only relationship the access
/// rules care about.
#[derive(Debug, Clone)]
pub struct Course {
    pub id: CourseId,
    pub title: CourseTitle,
    pub description: Option<String>,
    pub teacher_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Course unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CourseId(pub Uuid);

impl CourseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a course ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, CourseIdError> {
        Uuid::parse_str(s)
            .map(CourseId)
            .map_err(|e| CourseIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for CourseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseTitle(String);

impl CourseTitle {
    const MAX_LENGTH: usize = 200;

    /// # Errors
    /// * `Empty` - Title is blank
    /// * `TooLong` - Title exceeds 200 characters
    pub fn new(title: String) -> Result<Self, CourseTitleError> {
        let title = title.trim().to_string();
        let length = title.chars().count();
        if length == 0 {
            Err(CourseTitleError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(CourseTitleError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(title))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Membership of a student in a course. Withdrawal flips `active` off.
#[derive(Debug, Clone)]
pub struct Enrollment {
    pub course_id: CourseId,
    pub student_id: UserId,
    pub active: bool,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CreateCourseCommand {
    pub title: CourseTitle,
    pub description: Option<String>,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Default)]
pub struct UpdateCourseCommand {
    pub title: Option<CourseTitle>,
    pub description: Option<String>,
}

/// Course as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub teacher_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Course> for CourseView {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.to_string(),
            title: course.title.as_str().to_string(),
            description: course.description.clone(),
            teacher_id: course.teacher_id.to_string(),
            created_at: course.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_title_limits() {
        assert!(matches!(
            CourseTitle::new("  ".to_string()),
            Err(CourseTitleError::Empty)
        ));
        assert_eq!(
            CourseTitle::new(" Rust 101 ".to_string()).unwrap().as_str(),
            "Rust 101"
        );
        assert!(CourseTitle::new("t".repeat(201)).is_err());
    }

    #[test]
    fn test_course_id_parse() {
        let id = CourseId::new();
        assert_eq!(CourseId::from_string(&id.to_string()).unwrap(), id);
        assert!(CourseId::from_string("c1").is_err());
    }
}
