use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::course::errors::CourseError;
use crate::domain::course::models::Course;
use crate::domain::course::models::CourseId;
use crate::domain::course::models::CreateCourseCommand;
use crate::domain::course::models::Enrollment;
use crate::domain::course::models::UpdateCourseCommand;
use crate::domain::course::ports::CourseRepository;
use crate::domain::course::ports::CourseServicePort;
use crate::domain::identity::models::AuthenticatedIdentity;
use crate::domain::identity::models::Role;
use crate::domain::identity::models::UserId;

pub struct CourseService<R>
where
    R: CourseRepository,
{
    repository: Arc<R>,
}

impl<R> CourseService<R>
where
    R: CourseRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    async fn require_course(&self, id: &CourseId) -> Result<Course, CourseError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| CourseError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<R> CourseServicePort for CourseService<R>
where
    R: CourseRepository,
{
    async fn create_course(
        &self,
        owner: &AuthenticatedIdentity,
        command: CreateCourseCommand,
    ) -> Result<Course, CourseError> {
        if owner.role == Role::Student {
            return Err(CourseError::Forbidden(
                "only teachers and admins can create courses".to_string(),
            ));
        }

        let course = Course {
            id: CourseId::new(),
            title: command.title,
            description: command.description,
            teacher_id: owner.user_id,
            created_at: Utc::now(),
        };

        let created = self.repository.insert(course).await?;
        tracing::info!(course_id = %created.id, teacher_id = %created.teacher_id, "Course created");

        Ok(created)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, CourseError> {
        Ok(self.repository.list_all().await?)
    }

    async fn get_course(&self, id: &CourseId) -> Result<Course, CourseError> {
        self.require_course(id).await
    }

    async fn update_course(
        &self,
        id: &CourseId,
        command: UpdateCourseCommand,
    ) -> Result<Course, CourseError> {
        let mut course = self.require_course(id).await?;

        if let Some(title) = command.title {
            course.title = title;
        }
        if let Some(description) = command.description {
            course.description = Some(description);
        }

        Ok(self.repository.update(course).await?)
    }

    async fn delete_course(&self, id: &CourseId) -> Result<(), CourseError> {
        self.repository.delete(id).await?;
        tracing::info!(course_id = %id, "Course deleted");
        Ok(())
    }

    async fn enroll(&self, id: &CourseId, student: &UserId) -> Result<Enrollment, CourseError> {
        self.require_course(id).await?;

        if let Some(existing) = self.repository.find_enrollment(id, student).await? {
            if existing.active {
                return Err(CourseError::AlreadyEnrolled(id.to_string()));
            }
        }

        let enrollment = Enrollment {
            course_id: *id,
            student_id: *student,
            active: true,
            enrolled_at: Utc::now(),
        };
        self.repository.save_enrollment(enrollment.clone()).await?;
        tracing::info!(course_id = %id, user_id = %student, "Enrollment activated");

        Ok(enrollment)
    }

    async fn withdraw(&self, id: &CourseId, student: &UserId) -> Result<(), CourseError> {
        let mut enrollment = match self.repository.find_enrollment(id, student).await? {
            Some(enrollment) if enrollment.active => enrollment,
            _ => return Err(CourseError::NotEnrolled(id.to_string())),
        };

        enrollment.active = false;
        self.repository.save_enrollment(enrollment).await?;
        tracing::info!(course_id = %id, user_id = %student, "Enrollment withdrawn");

        Ok(())
    }

    async fn roster(&self, id: &CourseId) -> Result<Vec<UserId>, CourseError> {
        self.require_course(id).await?;
        Ok(self.repository.list_active_students(id).await?)
    }
}
