use thiserror::Error;

use crate::domain::identity::errors::StoreError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CourseIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CourseTitleError {
    #[error("Course title is empty")]
    Empty,

    #[error("Course title too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Top-level error for course operations
#[derive(Debug, Clone, Error)]
pub enum CourseError {
    #[error("Course not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Already enrolled in course {0}")]
    AlreadyEnrolled(String),

    #[error("Not enrolled in course {0}")]
    NotEnrolled(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for CourseError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Missing(what) => CourseError::NotFound(what),
            StoreError::Duplicate(what) => CourseError::AlreadyEnrolled(what),
            StoreError::Backend(msg) => CourseError::Store(msg),
        }
    }
}
