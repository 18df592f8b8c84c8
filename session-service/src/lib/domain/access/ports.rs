use async_trait::async_trait;

use crate::domain::access::errors::AccessError;
use crate::domain::access::models::AccessGrant;
use crate::domain::access::models::PolicySet;
use crate::domain::access::models::ResourceRef;
use crate::domain::identity::errors::StoreError;
use crate::domain::identity::models::AuthenticatedIdentity;
use crate::domain::identity::models::UserId;

/// Port for per-endpoint access decisions.
#[async_trait]
pub trait AccessResolverPort: Send + Sync + 'static {
    /// Decide whether `caller` may act on `resource` under `policies`.
    ///
    /// # Arguments
    /// * `caller` - Authenticated identity, if the request carried one
    /// * `resource` - Target extracted from the request, if any
    /// * `policies` - Policies declared on the endpoint (OR-combined)
    ///
    /// # Errors
    /// * `Forbidden` - No caller, or no policy satisfied
    /// * `NotFound` - Resource does not exist
    /// * `BadRequest` - No resource id on a non-public endpoint
    async fn resolve(
        &self,
        caller: Option<&AuthenticatedIdentity>,
        resource: Option<&ResourceRef>,
        policies: &PolicySet,
    ) -> Result<AccessGrant, AccessError>;
}

/// Relationship facts computed on demand from the record stores.
///
/// An id that does not parse for its kind is reported as nonexistent.
#[async_trait]
pub trait ResourceRelationships: Send + Sync + 'static {
    async fn exists(&self, resource: &ResourceRef) -> Result<bool, StoreError>;

    async fn is_owner(&self, resource: &ResourceRef, caller: &UserId) -> Result<bool, StoreError>;

    async fn is_enrolled(&self, resource: &ResourceRef, caller: &UserId)
        -> Result<bool, StoreError>;
}
