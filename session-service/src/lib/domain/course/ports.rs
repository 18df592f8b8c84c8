use async_trait::async_trait;

use crate::domain::course::errors::CourseError;
use crate::domain::course::models::Course;
use crate::domain::course::models::CourseId;
use crate::domain::course::models::CreateCourseCommand;
use crate::domain::course::models::Enrollment;
use crate::domain::course::models::UpdateCourseCommand;
use crate::domain::identity::errors::StoreError;
use crate::domain::identity::models::AuthenticatedIdentity;
use crate::domain::identity::models::UserId;

/// Port for the thin course/enrollment operations behind guarded routes.
///
/// Access policies are enforced before these are called; the service only
/// checks what the policies cannot express (who may create a course).
#[async_trait]
pub trait CourseServicePort: Send + Sync + 'static {
    /// # Errors
    /// * `Forbidden` - Caller is neither teacher nor admin
    async fn create_course(
        &self,
        owner: &AuthenticatedIdentity,
        command: CreateCourseCommand,
    ) -> Result<Course, CourseError>;

    async fn list_courses(&self) -> Result<Vec<Course>, CourseError>;

    /// # Errors
    /// * `NotFound` - Course does not exist
    async fn get_course(&self, id: &CourseId) -> Result<Course, CourseError>;

    /// # Errors
    /// * `NotFound` - Course does not exist
    async fn update_course(
        &self,
        id: &CourseId,
        command: UpdateCourseCommand,
    ) -> Result<Course, CourseError>;

    /// # Errors
    /// * `NotFound` - Course does not exist
    async fn delete_course(&self, id: &CourseId) -> Result<(), CourseError>;

    /// Enroll `student` in the course, reactivating a previous withdrawal.
    ///
    /// # Errors
    /// * `NotFound` - Course does not exist
    /// * `AlreadyEnrolled` - Active enrollment exists
    async fn enroll(&self, id: &CourseId, student: &UserId) -> Result<Enrollment, CourseError>;

    /// # Errors
    /// * `NotEnrolled` - No active enrollment
    async fn withdraw(&self, id: &CourseId, student: &UserId) -> Result<(), CourseError>;

    /// Ids of actively enrolled students.
    ///
    /// # Errors
    /// * `NotFound` - Course does not exist
    async fn roster(&self, id: &CourseId) -> Result<Vec<UserId>, CourseError>;
}

/// Persistence operations for courses and enrollments.
#[async_trait]
pub trait CourseRepository: Send + Sync + 'static {
    async fn insert(&self, course: Course) -> Result<Course, StoreError>;

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Course>, StoreError>;

    /// # Errors
    /// * `Missing` - Course does not exist
    async fn update(&self, course: Course) -> Result<Course, StoreError>;

    /// Delete the course and its enrollments.
    ///
    /// # Errors
    /// * `Missing` - Course does not exist
    async fn delete(&self, id: &CourseId) -> Result<(), StoreError>;

    async fn find_enrollment(
        &self,
        course_id: &CourseId,
        student_id: &UserId,
    ) -> Result<Option<Enrollment>, StoreError>;

    /// Insert or replace the enrollment for `(course_id, student_id)`.
    async fn save_enrollment(&self, enrollment: Enrollment) -> Result<(), StoreError>;

    async fn list_active_students(&self, course_id: &CourseId) -> Result<Vec<UserId>, StoreError>;
}
