use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::identity::errors::NotifierError;
use crate::domain::identity::events::PasswordResetRequestedEvent;
use crate::domain::identity::ports::ResetNotifier;
use crate::outbound::events::messages::PasswordResetRequestedMessage;

/// Records reset notifications instead of delivering them.
///
/// Used when no broker is configured; the messages are logged at debug level.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOutbox {
    messages: Arc<RwLock<Vec<PasswordResetRequestedMessage>>>,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<PasswordResetRequestedMessage> {
        self.messages.read().await.clone()
    }

    /// Most recent reset message addressed to `email`.
    pub async fn latest_for(&self, email: &str) -> Option<PasswordResetRequestedMessage> {
        self.messages
            .read()
            .await
            .iter()
            .rev()
            .find(|message| message.email == email)
            .cloned()
    }
}

#[async_trait]
impl ResetNotifier for InMemoryOutbox {
    async fn send_reset_link(
        &self,
        event: &PasswordResetRequestedEvent,
    ) -> Result<(), NotifierError> {
        tracing::debug!(user_id = %event.user_id, "Reset notification queued in outbox");
        self.messages
            .write()
            .await
            .push(PasswordResetRequestedMessage::from(event));
        Ok(())
    }
}
