use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::access::errors::AccessError;
use crate::domain::access::models::AccessGrant;
use crate::domain::access::models::Policy;
use crate::domain::access::models::PolicySet;
use crate::domain::access::models::ResourceRef;
use crate::domain::access::ports::AccessResolverPort;
use crate::domain::access::ports::ResourceRelationships;
use crate::domain::identity::models::AuthenticatedIdentity;

/// Evaluates endpoint policy sets against computed resource relationships.
///
/// Order: public short-circuit, caller required, resource must exist, admin
/// override, then `own` before `enrolled`. Existence is checked before any
/// permission, so a missing resource is always `NotFound`.
pub struct AccessResolver<RR>
where
    RR: ResourceRelationships,
{
    relationships: Arc<RR>,
}

impl<RR> AccessResolver<RR>
where
    RR: ResourceRelationships,
{
    pub fn new(relationships: Arc<RR>) -> Self {
        Self { relationships }
    }
}

#[async_trait]
impl<RR> AccessResolverPort for AccessResolver<RR>
where
    RR: ResourceRelationships,
{
    async fn resolve(
        &self,
        caller: Option<&AuthenticatedIdentity>,
        resource: Option<&ResourceRef>,
        policies: &PolicySet,
    ) -> Result<AccessGrant, AccessError> {
        if policies.is_public() {
            return Ok(AccessGrant::Public);
        }

        let caller = caller
            .ok_or_else(|| AccessError::Forbidden("authentication required".to_string()))?;

        let resource = resource.ok_or_else(|| {
            AccessError::BadRequest("request does not name a target resource".to_string())
        })?;

        if !self.relationships.exists(resource).await? {
            return Err(AccessError::NotFound(resource.to_string()));
        }

        if caller.role.is_admin() && policies.contains(Policy::Admin) {
            tracing::debug!(user_id = %caller.user_id, resource = %resource, "Admin override");
            return Ok(AccessGrant::Admin);
        }

        if policies.contains(Policy::Own)
            && self
                .relationships
                .is_owner(resource, &caller.user_id)
                .await?
        {
            return Ok(AccessGrant::Owner);
        }

        if policies.contains(Policy::Enrolled)
            && self
                .relationships
                .is_enrolled(resource, &caller.user_id)
                .await?
        {
            return Ok(AccessGrant::Enrolled);
        }

        tracing::info!(
            user_id = %caller.user_id,
            resource = %resource,
            policies = %policies,
            "Access denied"
        );
        Err(AccessError::Forbidden(format!(
            "requires one of {} on {}",
            policies, resource.kind
        )))
    }
}
