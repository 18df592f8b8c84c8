use std::time::Duration;

use async_trait::async_trait;

use crate::domain::identity::errors::NotifierError;
use crate::domain::identity::errors::SessionError;
use crate::domain::identity::errors::StoreError;
use crate::domain::identity::events::PasswordResetRequestedEvent;
use crate::domain::identity::models::AuthenticatedIdentity;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::LoginOutcome;
use crate::domain::identity::models::Password;
use crate::domain::identity::models::PublicIdentity;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::SessionKey;
use crate::domain::identity::models::SessionTokens;
use crate::domain::identity::models::UserId;

/// Port for the session lifecycle: issuance, rotation and revocation.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Register a new identity. Does not log the caller in.
    ///
    /// # Errors
    /// * `Conflict` - Email already registered
    /// * `BadRequest` - Self-registration as admin
    async fn register(&self, command: RegisterCommand) -> Result<PublicIdentity, SessionError>;

    /// Exchange credentials for an access/refresh pair.
    ///
    /// Overwrites any previously stored refresh token for the identity.
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown email, inactive account or wrong password
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError>;

    /// Rotate a refresh token into a new access/refresh pair.
    ///
    /// # Errors
    /// * `Unauthorized` - Invalid, expired, superseded or revoked token
    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, SessionError>;

    /// Drop the stored refresh token and revoke outstanding access tokens.
    ///
    /// Idempotent.
    async fn logout(&self, id: &UserId) -> Result<(), SessionError>;

    /// Replace the password after checking the current one.
    ///
    /// # Errors
    /// * `BadRequest` - Current password does not verify
    /// * `NotFound` - Identity does not exist
    async fn change_password(
        &self,
        id: &UserId,
        current_password: &str,
        new_password: Password,
    ) -> Result<(), SessionError>;

    /// Mint and deliver a reset token if the email is registered.
    ///
    /// Succeeds identically whether or not the email exists.
    async fn forgot_password(&self, email: &str) -> Result<(), SessionError>;

    /// Consume a reset token and set a new password.
    ///
    /// # Errors
    /// * `Unauthorized` - Invalid, expired, consumed or superseded reset token
    async fn reset_password(
        &self,
        reset_token: &str,
        new_password: Password,
    ) -> Result<(), SessionError>;

    /// Resolve a bearer access token into an identity.
    ///
    /// # Errors
    /// * `Unauthorized` - Bad signature, expired, wrong kind, revoked,
    ///   unknown or inactive identity
    async fn authenticate(&self, access_token: &str)
        -> Result<AuthenticatedIdentity, SessionError>;

    /// Re-read the identity; fails closed when absent or inactive.
    ///
    /// # Errors
    /// * `Unauthorized` - Identity missing or deactivated
    async fn validate(&self, id: &UserId) -> Result<Identity, SessionError>;

    /// True if a revocation marker at or after `issued_at_ms` exists.
    async fn is_revoked(&self, id: &UserId, issued_at_ms: i64) -> Result<bool, SessionError>;

    /// Public view of an identity.
    ///
    /// # Errors
    /// * `NotFound` - Identity does not exist
    async fn current_identity(&self, id: &UserId) -> Result<PublicIdentity, SessionError>;

    /// Activate or deactivate an identity. Deactivation ends every session.
    ///
    /// # Errors
    /// * `NotFound` - Identity does not exist
    async fn set_active(&self, id: &UserId, active: bool) -> Result<PublicIdentity, SessionError>;
}

/// Persistence operations for identity records.
#[async_trait]
pub trait CredentialRepository: Send + Sync + 'static {
    /// # Errors
    /// * `Backend` - Store operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Identity>, StoreError>;

    /// # Errors
    /// * `Backend` - Store operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Identity>, StoreError>;

    /// Persist a new identity.
    ///
    /// # Errors
    /// * `Duplicate` - Email is already registered
    /// * `Backend` - Store operation failed
    async fn insert(&self, identity: Identity) -> Result<Identity, StoreError>;

    /// # Errors
    /// * `Missing` - Identity does not exist
    /// * `Backend` - Store operation failed
    async fn update_password_hash(&self, id: &UserId, password_hash: &str)
        -> Result<(), StoreError>;

    /// # Errors
    /// * `Missing` - Identity does not exist
    /// * `Backend` - Store operation failed
    async fn update_active_flag(&self, id: &UserId, active: bool) -> Result<(), StoreError>;
}

/// Key-value cache with per-key time-to-live.
///
/// Each `set` overwrites the previous value for the key (last writer wins).
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    async fn set(&self, key: &SessionKey, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Returns `None` for absent or expired keys.
    async fn get(&self, key: &SessionKey) -> Result<Option<String>, StoreError>;

    /// Deleting an absent key is not an error.
    async fn delete(&self, key: &SessionKey) -> Result<(), StoreError>;
}

/// Delivery of password reset links (email, queue, ...).
#[async_trait]
pub trait ResetNotifier: Send + Sync + 'static {
    /// # Errors
    /// * `SerializationFailed` - Event could not be encoded
    /// * `DeliveryFailed` - Transport rejected the notification
    async fn send_reset_link(&self, event: &PasswordResetRequestedEvent)
        -> Result<(), NotifierError>;
}
