use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::identity::events::PasswordResetRequestedEvent;

/// Serializable envelope for notification events.
///
/// Consumed by the mail worker, which renders the reset link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum NotificationMessage {
    PasswordResetRequested(PasswordResetRequestedMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetRequestedMessage {
    pub event_id: String,
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub reset_token: String,
    pub expires_at: DateTime<Utc>,
    pub requested_at: DateTime<Utc>,
}

impl From<&PasswordResetRequestedEvent> for PasswordResetRequestedMessage {
    fn from(event: &PasswordResetRequestedEvent) -> Self {
        Self {
            event_id: event.event_id.clone(),
            user_id: event.user_id.clone(),
            email: event.email.clone(),
            display_name: event.display_name.clone(),
            reset_token: event.reset_token.clone(),
            expires_at: event.expires_at,
            requested_at: event.requested_at,
        }
    }
}

impl From<&PasswordResetRequestedEvent> for NotificationMessage {
    fn from(event: &PasswordResetRequestedEvent) -> Self {
        NotificationMessage::PasswordResetRequested(PasswordResetRequestedMessage::from(event))
    }
}
