use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::course::models::Course;
use crate::domain::course::models::CourseId;
use crate::domain::course::models::Enrollment;
use crate::domain::course::ports::CourseRepository;
use crate::domain::identity::errors::StoreError;
use crate::domain::identity::models::UserId;

/// Process-local course and enrollment store for development and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCourseRepository {
    courses: Arc<RwLock<HashMap<CourseId, Course>>>,
    enrollments: Arc<RwLock<HashMap<(CourseId, UserId), Enrollment>>>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn insert(&self, course: Course) -> Result<Course, StoreError> {
        self.courses.write().await.insert(course.id, course.clone());
        Ok(course)
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, StoreError> {
        Ok(self.courses.read().await.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Course>, StoreError> {
        let mut courses: Vec<Course> = self.courses.read().await.values().cloned().collect();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(courses)
    }

    async fn update(&self, course: Course) -> Result<Course, StoreError> {
        let mut courses = self.courses.write().await;
        match courses.get_mut(&course.id) {
            Some(existing) => {
                *existing = course.clone();
                Ok(course)
            }
            None => Err(StoreError::Missing(course.id.to_string())),
        }
    }

    async fn delete(&self, id: &CourseId) -> Result<(), StoreError> {
        if self.courses.write().await.remove(id).is_none() {
            return Err(StoreError::Missing(id.to_string()));
        }

        self.enrollments
            .write()
            .await
            .retain(|(course_id, _), _| course_id != id);
        Ok(())
    }

    async fn find_enrollment(
        &self,
        course_id: &CourseId,
        student_id: &UserId,
    ) -> Result<Option<Enrollment>, StoreError> {
        Ok(self
            .enrollments
            .read()
            .await
            .get(&(*course_id, *student_id))
            .cloned())
    }

    async fn save_enrollment(&self, enrollment: Enrollment) -> Result<(), StoreError> {
        self.enrollments
            .write()
            .await
            .insert((enrollment.course_id, enrollment.student_id), enrollment);
        Ok(())
    }

    async fn list_active_students(&self, course_id: &CourseId) -> Result<Vec<UserId>, StoreError> {
        let mut active: Vec<Enrollment> = self
            .enrollments
            .read()
            .await
            .values()
            .filter(|enrollment| enrollment.course_id == *course_id && enrollment.active)
            .cloned()
            .collect();
        active.sort_by_key(|enrollment| enrollment.enrolled_at);

        Ok(active
            .into_iter()
            .map(|enrollment| enrollment.student_id)
            .collect())
    }
}
