use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::identity::errors::StoreError;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::UserId;
use crate::domain::identity::ports::CredentialRepository;

/// Process-local credential store for development and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialRepository {
    identities: Arc<RwLock<HashMap<UserId, Identity>>>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Identity>, StoreError> {
        Ok(self
            .identities
            .read()
            .await
            .values()
            .find(|identity| identity.email == *email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Identity>, StoreError> {
        Ok(self.identities.read().await.get(id).cloned())
    }

    async fn insert(&self, identity: Identity) -> Result<Identity, StoreError> {
        let mut identities = self.identities.write().await;

        if identities
            .values()
            .any(|existing| existing.email == identity.email)
        {
            return Err(StoreError::Duplicate(identity.email.as_str().to_string()));
        }

        identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut identities = self.identities.write().await;
        let identity = identities
            .get_mut(id)
            .ok_or_else(|| StoreError::Missing(id.to_string()))?;

        identity.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn update_active_flag(&self, id: &UserId, active: bool) -> Result<(), StoreError> {
        let mut identities = self.identities.write().await;
        let identity = identities
            .get_mut(id)
            .ok_or_else(|| StoreError::Missing(id.to_string()))?;

        identity.active = active;
        Ok(())
    }
}
