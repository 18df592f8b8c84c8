use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::identity::models::Identity;

/// Domain event raised when a password reset link must be delivered.
///
/// Carries the signed reset token; the notification collaborator turns it
/// into an email link.
#[derive(Debug, Clone)]
pub struct PasswordResetRequestedEvent {
    pub event_id: String,
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub reset_token: String,
    pub expires_at: DateTime<Utc>,
    pub requested_at: DateTime<Utc>,
}

impl PasswordResetRequestedEvent {
    pub fn new(identity: &Identity, reset_token: String, expires_at_secs: i64) -> Self {
        let requested_at = Utc::now();
        Self {
            event_id: Uuid::new_v4().to_string(),
            user_id: identity.id.to_string(),
            email: identity.email.as_str().to_string(),
            display_name: identity.display_name.as_str().to_string(),
            reset_token,
            expires_at: Utc
                .timestamp_opt(expires_at_secs, 0)
                .single()
                .unwrap_or(requested_at),
            requested_at,
        }
    }
}
