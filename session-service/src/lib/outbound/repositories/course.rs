use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::course::models::Course;
use crate::domain::course::models::CourseId;
use crate::domain::course::models::CourseTitle;
use crate::domain::course::models::Enrollment;
use crate::domain::course::ports::CourseRepository;
use crate::domain::identity::errors::StoreError;
use crate::domain::identity::models::UserId;

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    teacher_id: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<CourseRow> for Course {
    type Error = StoreError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let title = CourseTitle::new(row.title).map_err(|e| {
            StoreError::Backend(format!("Corrupt title for course {}: {}", row.id, e))
        })?;

        Ok(Course {
            id: CourseId(row.id),
            title,
            description: row.description,
            teacher_id: UserId(row.teacher_id),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EnrollmentRow {
    course_id: Uuid,
    student_id: Uuid,
    active: bool,
    enrolled_at: DateTime<Utc>,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Enrollment {
            course_id: CourseId(row.course_id),
            student_id: UserId(row.student_id),
            active: row.active,
            enrolled_at: row.enrolled_at,
        }
    }
}

pub struct PostgresCourseRepository {
    pool: PgPool,
}

impl PostgresCourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn insert(&self, course: Course) -> Result<Course, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO courses (id, title, description, teacher_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(course.id.0)
        .bind(course.title.as_str())
        .bind(&course.description)
        .bind(course.teacher_id.0)
        .bind(course.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(course)
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, StoreError> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, title, description, teacher_id, created_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(Course::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, title, description, teacher_id, created_at
            FROM courses
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter().map(Course::try_from).collect()
    }

    async fn update(&self, course: Course) -> Result<Course, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE courses
            SET title = $2, description = $3
            WHERE id = $1
            "#,
        )
        .bind(course.id.0)
        .bind(course.title.as_str())
        .bind(&course.description)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(course.id.to_string()));
        }

        Ok(course)
    }

    async fn delete(&self, id: &CourseId) -> Result<(), StoreError> {
        // Enrollments go with the course via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(id.to_string()));
        }

        Ok(())
    }

    async fn find_enrollment(
        &self,
        course_id: &CourseId,
        student_id: &UserId,
    ) -> Result<Option<Enrollment>, StoreError> {
        let row = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT course_id, student_id, active, enrolled_at
            FROM enrollments
            WHERE course_id = $1 AND student_id = $2
            "#,
        )
        .bind(course_id.0)
        .bind(student_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(row.map(Enrollment::from))
    }

    async fn save_enrollment(&self, enrollment: Enrollment) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (course_id, student_id, active, enrolled_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (course_id, student_id)
            DO UPDATE SET active = EXCLUDED.active, enrolled_at = EXCLUDED.enrolled_at
            "#,
        )
        .bind(enrollment.course_id.0)
        .bind(enrollment.student_id.0)
        .bind(enrollment.active)
        .bind(enrollment.enrolled_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn list_active_students(&self, course_id: &CourseId) -> Result<Vec<UserId>, StoreError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT student_id
            FROM enrollments
            WHERE course_id = $1 AND active
            ORDER BY enrolled_at
            "#,
        )
        .bind(course_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(|(id,)| UserId(id)).collect())
    }
}
