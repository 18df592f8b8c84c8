use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::access::models::ResourceKind;
use crate::domain::access::models::ResourceRef;
use crate::domain::access::ports::ResourceRelationships;
use crate::domain::course::models::Course;
use crate::domain::course::models::CourseId;
use crate::domain::course::ports::CourseRepository;
use crate::domain::identity::errors::StoreError;
use crate::domain::identity::models::UserId;
use crate::domain::identity::ports::CredentialRepository;

/// Relationship facts backed by the credential and course stores.
///
/// Course: owner is `teacher_id`, membership is an active enrollment.
/// User: owner is the user themself; users have no members.
pub struct StoreRelationships<CR, CoR>
where
    CR: CredentialRepository,
    CoR: CourseRepository,
{
    credentials: Arc<CR>,
    courses: Arc<CoR>,
}

impl<CR, CoR> StoreRelationships<CR, CoR>
where
    CR: CredentialRepository,
    CoR: CourseRepository,
{
    pub fn new(credentials: Arc<CR>, courses: Arc<CoR>) -> Self {
        Self {
            credentials,
            courses,
        }
    }

    async fn course(&self, id: &str) -> Result<Option<Course>, StoreError> {
        match CourseId::from_string(id) {
            Ok(course_id) => self.courses.find_by_id(&course_id).await,
            Err(_) => Ok(None),
        }
    }
}

#[async_trait]
impl<CR, CoR> ResourceRelationships for StoreRelationships<CR, CoR>
where
    CR: CredentialRepository,
    CoR: CourseRepository,
{
    async fn exists(&self, resource: &ResourceRef) -> Result<bool, StoreError> {
        match resource.kind {
            ResourceKind::Course => Ok(self.course(&resource.id).await?.is_some()),
            ResourceKind::User => match UserId::from_string(&resource.id) {
                Ok(user_id) => Ok(self.credentials.find_by_id(&user_id).await?.is_some()),
                Err(_) => Ok(false),
            },
        }
    }

    async fn is_owner(&self, resource: &ResourceRef, caller: &UserId) -> Result<bool, StoreError> {
        match resource.kind {
            ResourceKind::Course => Ok(self
                .course(&resource.id)
                .await?
                .is_some_and(|course| course.teacher_id == *caller)),
            ResourceKind::User => {
                Ok(UserId::from_string(&resource.id).is_ok_and(|user_id| user_id == *caller))
            }
        }
    }

    async fn is_enrolled(
        &self,
        resource: &ResourceRef,
        caller: &UserId,
    ) -> Result<bool, StoreError> {
        match resource.kind {
            ResourceKind::Course => {
                let Ok(course_id) = CourseId::from_string(&resource.id) else {
                    return Ok(false);
                };
                Ok(self
                    .courses
                    .find_enrollment(&course_id, caller)
                    .await?
                    .is_some_and(|enrollment| enrollment.active))
            }
            ResourceKind::User => Ok(false),
        }
    }
}
