use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenClaims;
use auth::TokenKind;
use chrono::Utc;
use tokio::sync::OnceCell;

use crate::domain::identity::errors::SessionError;
use crate::domain::identity::events::PasswordResetRequestedEvent;
use crate::domain::identity::models::AuthenticatedIdentity;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::LoginOutcome;
use crate::domain::identity::models::Password;
use crate::domain::identity::models::PublicIdentity;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::Role;
use crate::domain::identity::models::SessionKey;
use crate::domain::identity::models::SessionTokens;
use crate::domain::identity::models::UserId;
use crate::domain::identity::ports::CredentialRepository;
use crate::domain::identity::ports::ResetNotifier;
use crate::domain::identity::ports::SessionServicePort;
use crate::domain::identity::ports::SessionStore;

/// Session lifecycle state machine.
///
/// Per identity: no session, active (refresh token stored), rotated on every
/// refresh, revoked on logout. The session store is the only shared state;
/// concurrent refreshes race last-writer-wins and the loser's token fails on
/// its next use.
pub struct SessionService<CR, SS, RN>
where
    CR: CredentialRepository,
    SS: SessionStore,
    RN: ResetNotifier + ?Sized,
{
    credentials: Arc<CR>,
    sessions: Arc<SS>,
    notifier: Arc<RN>,
    authenticator: Authenticator,
    /// Hash verified against when no account matches, so unknown emails
    /// cost the same Argon2 work as real ones.
    decoy_hash: OnceCell<String>,
}

impl<CR, SS, RN> SessionService<CR, SS, RN>
where
    CR: CredentialRepository,
    SS: SessionStore,
    RN: ResetNotifier + ?Sized,
{
    /// Create a new session service with injected dependencies.
    ///
    /// # Arguments
    /// * `credentials` - Identity record store
    /// * `sessions` - TTL cache for refresh tokens, revocation markers and reset tokens
    /// * `notifier` - Reset link delivery
    /// * `authenticator` - Token signing and password hashing
    pub fn new(
        credentials: Arc<CR>,
        sessions: Arc<SS>,
        notifier: Arc<RN>,
        authenticator: Authenticator,
    ) -> Self {
        Self {
            credentials,
            sessions,
            notifier,
            authenticator,
            decoy_hash: OnceCell::new(),
        }
    }

    async fn hash_password(&self, password: &Password) -> Result<String, SessionError> {
        self.hash_plaintext(password.expose()).await
    }

    async fn hash_plaintext(&self, password: &str) -> Result<String, SessionError> {
        let hasher = self.authenticator.password_hasher();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| SessionError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| SessionError::Internal(format!("Password hashing failed: {}", e)))
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, SessionError> {
        let hasher = self.authenticator.password_hasher();
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| {
                SessionError::Internal(format!("Password verification task failed: {}", e))
            })?
            .map_err(|e| SessionError::Internal(format!("Password verification failed: {}", e)))
    }

    async fn decoy_hash(&self) -> Result<&str, SessionError> {
        self.decoy_hash
            .get_or_try_init(|| self.hash_plaintext("decoy-password-never-matches"))
            .await
            .map(String::as_str)
    }

    async fn create_identity(
        &self,
        command: RegisterCommand,
        role: Role,
    ) -> Result<Identity, SessionError> {
        if self
            .credentials
            .find_by_email(&command.email)
            .await?
            .is_some()
        {
            return Err(SessionError::Conflict(command.email.to_string()));
        }

        let password_hash = self.hash_password(&command.password).await?;

        let identity = Identity {
            id: UserId::new(),
            email: command.email,
            password_hash,
            role,
            display_name: command.display_name,
            active: true,
            // Operator-provisioned admins need no email round trip.
            verified: role.is_admin(),
            created_at: Utc::now(),
        };

        Ok(self.credentials.insert(identity).await?)
    }

    /// Create the configured administrator unless the email is already taken.
    ///
    /// Admins cannot self-register, so this is the only way one comes into
    /// existence on a fresh store. An existing admin with the same email is
    /// left untouched.
    ///
    /// # Errors
    /// * `Conflict` - Email belongs to a non-admin account
    pub async fn ensure_admin(
        &self,
        command: RegisterCommand,
    ) -> Result<PublicIdentity, SessionError> {
        if let Some(existing) = self.credentials.find_by_email(&command.email).await? {
            if !existing.role.is_admin() {
                return Err(SessionError::Conflict(command.email.to_string()));
            }
            tracing::debug!(user_id = %existing.id, "Bootstrap admin already present");
            return Ok(PublicIdentity::from(&existing));
        }

        let created = self.create_identity(command, Role::Admin).await?;
        tracing::info!(user_id = %created.id, "Bootstrap admin created");

        Ok(PublicIdentity::from(&created))
    }

    fn ttl_of(&self, kind: TokenKind) -> Duration {
        self.authenticator
            .lifetimes()
            .lifetime_of(kind)
            .to_std()
            .unwrap_or_default()
    }

    /// Mint a pair for `identity` and make its refresh token the only valid one.
    async fn start_session(&self, identity: &Identity) -> Result<SessionTokens, SessionError> {
        let pair = self.authenticator.issue_pair(&identity.token_claims())?;

        self.sessions
            .set(
                &SessionKey::Refresh(identity.id),
                &pair.refresh_token,
                self.ttl_of(TokenKind::Refresh),
            )
            .await?;

        Ok(SessionTokens {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: self.ttl_of(TokenKind::Access).as_secs(),
        })
    }

    /// Delete the refresh token and write a revocation marker at "now".
    async fn revoke_sessions(&self, id: &UserId) -> Result<(), SessionError> {
        self.sessions.delete(&SessionKey::Refresh(*id)).await?;
        self.sessions
            .set(
                &SessionKey::Blacklist(*id),
                &Utc::now().timestamp_millis().to_string(),
                self.ttl_of(TokenKind::Access),
            )
            .await?;
        Ok(())
    }

    fn verify_token(&self, token: &str, kind: TokenKind) -> Result<(TokenClaims, UserId), SessionError> {
        let claims = self.authenticator.verify_token(token, kind).map_err(|e| {
            tracing::debug!(kind = %kind, error = %e, "Token rejected");
            SessionError::Unauthorized
        })?;

        let id = UserId::from_string(&claims.sub).map_err(|e| {
            tracing::warn!(kind = %kind, error = %e, "Token subject is not a user id");
            SessionError::Unauthorized
        })?;

        Ok((claims, id))
    }
}

#[async_trait]
impl<CR, SS, RN> SessionServicePort for SessionService<CR, SS, RN>
where
    CR: CredentialRepository,
    SS: SessionStore,
    RN: ResetNotifier + ?Sized,
{
    async fn register(&self, command: RegisterCommand) -> Result<PublicIdentity, SessionError> {
        let role = command.role.unwrap_or_default();
        if role.is_admin() {
            return Err(SessionError::BadRequest(
                "Admin accounts cannot be self-registered".to_string(),
            ));
        }

        let created = self.create_identity(command, role).await?;
        tracing::info!(user_id = %created.id, role = %created.role, "Identity registered");

        Ok(PublicIdentity::from(&created))
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError> {
        let email =
            EmailAddress::new(email.to_string()).map_err(|_| SessionError::Unauthorized)?;

        let identity = self.credentials.find_by_email(&email).await?;

        // Verify before any other check so every rejection pays the same hashing cost.
        let stored_hash = match &identity {
            Some(identity) => identity.password_hash.as_str(),
            None => self.decoy_hash().await?,
        };
        let password_matches = self.verify_password(password, stored_hash).await?;

        let identity = match identity {
            Some(identity) => identity,
            None => {
                tracing::info!("Login rejected: unknown email");
                return Err(SessionError::Unauthorized);
            }
        };

        if !password_matches {
            tracing::info!(user_id = %identity.id, "Login rejected: password mismatch");
            return Err(SessionError::Unauthorized);
        }

        if !identity.active {
            tracing::info!(user_id = %identity.id, "Login rejected: account inactive");
            return Err(SessionError::Unauthorized);
        }

        let tokens = self.start_session(&identity).await?;
        tracing::info!(user_id = %identity.id, "Session started");

        Ok(LoginOutcome {
            tokens,
            identity: PublicIdentity::from(&identity),
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, SessionError> {
        let (claims, id) = self.verify_token(refresh_token, TokenKind::Refresh)?;

        let stored = self.sessions.get(&SessionKey::Refresh(id)).await?;
        if stored.as_deref() != Some(refresh_token) {
            tracing::warn!(user_id = %id, "Refresh rejected: token superseded or absent");
            return Err(SessionError::Unauthorized);
        }

        if self.is_revoked(&id, claims.iat_ms).await? {
            tracing::warn!(user_id = %id, "Refresh rejected: token revoked");
            return Err(SessionError::Unauthorized);
        }

        let identity = self.validate(&id).await?;
        let tokens = self.start_session(&identity).await?;
        tracing::info!(user_id = %id, "Refresh token rotated");

        Ok(tokens)
    }

    async fn logout(&self, id: &UserId) -> Result<(), SessionError> {
        self.revoke_sessions(id).await?;
        tracing::info!(user_id = %id, "Session revoked");
        Ok(())
    }

    async fn change_password(
        &self,
        id: &UserId,
        current_password: &str,
        new_password: Password,
    ) -> Result<(), SessionError> {
        let identity = self
            .credentials
            .find_by_id(id)
            .await?
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        if !self
            .verify_password(current_password, &identity.password_hash)
            .await?
        {
            return Err(SessionError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        let password_hash = self.hash_password(&new_password).await?;
        self.credentials
            .update_password_hash(id, &password_hash)
            .await?;

        // Outstanding access tokens stay valid until they expire.
        self.sessions.delete(&SessionKey::Refresh(*id)).await?;
        tracing::info!(user_id = %id, "Password changed");

        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<(), SessionError> {
        let Ok(email) = EmailAddress::new(email.to_string()) else {
            return Ok(());
        };

        let identity = match self.credentials.find_by_email(&email).await? {
            Some(identity) if identity.active => identity,
            _ => {
                tracing::debug!("Password reset requested for unknown or inactive email");
                return Ok(());
            }
        };

        let reset = self
            .authenticator
            .issue(&identity.token_claims(), TokenKind::Reset)?;

        self.sessions
            .set(
                &SessionKey::Reset(identity.id),
                &reset.token,
                self.ttl_of(TokenKind::Reset),
            )
            .await?;

        let event = PasswordResetRequestedEvent::new(&identity, reset.token, reset.claims.exp);
        if let Err(e) = self.notifier.send_reset_link(&event).await {
            tracing::error!(
                user_id = %identity.id,
                error = %e,
                "Failed to deliver password reset link"
            );
        } else {
            tracing::info!(user_id = %identity.id, "Password reset link issued");
        }

        Ok(())
    }

    async fn reset_password(
        &self,
        reset_token: &str,
        new_password: Password,
    ) -> Result<(), SessionError> {
        let (_, id) = self.verify_token(reset_token, TokenKind::Reset)?;

        let stored = self.sessions.get(&SessionKey::Reset(id)).await?;
        if stored.as_deref() != Some(reset_token) {
            tracing::warn!(user_id = %id, "Reset rejected: token consumed or superseded");
            return Err(SessionError::Unauthorized);
        }

        if self.credentials.find_by_id(&id).await?.is_none() {
            return Err(SessionError::Unauthorized);
        }

        // Consume before mutating so a replay racing this call finds nothing.
        self.sessions.delete(&SessionKey::Reset(id)).await?;

        let password_hash = self.hash_password(&new_password).await?;
        self.credentials
            .update_password_hash(&id, &password_hash)
            .await?;
        self.sessions.delete(&SessionKey::Refresh(id)).await?;
        tracing::info!(user_id = %id, "Password reset");

        Ok(())
    }

    async fn authenticate(
        &self,
        access_token: &str,
    ) -> Result<AuthenticatedIdentity, SessionError> {
        let (claims, id) = self.verify_token(access_token, TokenKind::Access)?;

        if self.is_revoked(&id, claims.iat_ms).await? {
            tracing::debug!(user_id = %id, "Access token revoked");
            return Err(SessionError::Unauthorized);
        }

        let identity = self.validate(&id).await?;

        Ok(AuthenticatedIdentity {
            user_id: identity.id,
            email: identity.email.as_str().to_string(),
            role: identity.role,
            display_name: identity.display_name.as_str().to_string(),
            issued_at_ms: claims.iat_ms,
        })
    }

    async fn validate(&self, id: &UserId) -> Result<Identity, SessionError> {
        match self.credentials.find_by_id(id).await? {
            Some(identity) if identity.active => Ok(identity),
            Some(_) => {
                tracing::debug!(user_id = %id, "Identity inactive");
                Err(SessionError::Unauthorized)
            }
            None => Err(SessionError::Unauthorized),
        }
    }

    async fn is_revoked(&self, id: &UserId, issued_at_ms: i64) -> Result<bool, SessionError> {
        let Some(marker) = self.sessions.get(&SessionKey::Blacklist(*id)).await? else {
            return Ok(false);
        };

        match marker.parse::<i64>() {
            Ok(revoked_at_ms) => Ok(revoked_at_ms >= issued_at_ms),
            Err(_) => {
                tracing::warn!(user_id = %id, "Unreadable revocation marker, failing closed");
                Ok(true)
            }
        }
    }

    async fn current_identity(&self, id: &UserId) -> Result<PublicIdentity, SessionError> {
        self.credentials
            .find_by_id(id)
            .await?
            .map(|identity| PublicIdentity::from(&identity))
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    async fn set_active(&self, id: &UserId, active: bool) -> Result<PublicIdentity, SessionError> {
        let mut identity = self
            .credentials
            .find_by_id(id)
            .await?
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        self.credentials.update_active_flag(id, active).await?;
        identity.active = active;

        if !active {
            self.revoke_sessions(id).await?;
        }
        tracing::info!(user_id = %id, active, "Identity activation changed");

        Ok(PublicIdentity::from(&identity))
    }
}

#[cfg(test)]
mod tests {
    use auth::PasswordHasher;
    use auth::TokenLifetimes;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::identity::errors::NotifierError;
    use crate::domain::identity::errors::StoreError;
    use crate::domain::identity::models::DisplayName;
    use crate::outbound::memory::InMemorySessionStore;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    mock! {
        pub TestCredentialRepository {}

        #[async_trait]
        impl CredentialRepository for TestCredentialRepository {
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Identity>, StoreError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<Identity>, StoreError>;
            async fn insert(&self, identity: Identity) -> Result<Identity, StoreError>;
            async fn update_password_hash(&self, id: &UserId, password_hash: &str) -> Result<(), StoreError>;
            async fn update_active_flag(&self, id: &UserId, active: bool) -> Result<(), StoreError>;
        }
    }

    mock! {
        pub TestResetNotifier {}

        #[async_trait]
        impl ResetNotifier for TestResetNotifier {
            async fn send_reset_link(&self, event: &PasswordResetRequestedEvent) -> Result<(), NotifierError>;
        }
    }

    mock! {
        pub TestSessionStore {}

        #[async_trait]
        impl SessionStore for TestSessionStore {
            async fn set(&self, key: &SessionKey, value: &str, ttl: Duration) -> Result<(), StoreError>;
            async fn get(&self, key: &SessionKey) -> Result<Option<String>, StoreError>;
            async fn delete(&self, key: &SessionKey) -> Result<(), StoreError>;
        }
    }

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_params(1024, 1, 1).unwrap()
    }

    fn authenticator() -> Authenticator {
        Authenticator::new(SECRET, TokenLifetimes::default())
            .unwrap()
            .with_password_hasher(hasher())
    }

    fn identity_with_password(password: &str) -> Identity {
        Identity {
            id: UserId::new(),
            email: EmailAddress::new("teacher@x.com".to_string()).unwrap(),
            password_hash: hasher().hash(password).unwrap(),
            role: Role::Teacher,
            display_name: DisplayName::new("Teacher".to_string()).unwrap(),
            active: true,
            verified: false,
            created_at: Utc::now(),
        }
    }

    fn repository_returning(identity: Identity) -> MockTestCredentialRepository {
        let mut repository = MockTestCredentialRepository::new();
        let by_email = identity.clone();
        repository
            .expect_find_by_email()
            .returning(move |_| Ok(Some(by_email.clone())));
        let by_id = identity.clone();
        repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(by_id.clone())));
        repository
    }

    fn service(
        repository: MockTestCredentialRepository,
        sessions: Arc<InMemorySessionStore>,
        notifier: MockTestResetNotifier,
    ) -> SessionService<MockTestCredentialRepository, InMemorySessionStore, MockTestResetNotifier>
    {
        SessionService::new(
            Arc::new(repository),
            sessions,
            Arc::new(notifier),
            authenticator(),
        )
    }

    #[tokio::test]
    async fn test_register_hashes_and_defaults_role() {
        let mut repository = MockTestCredentialRepository::new();
        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_insert()
            .withf(|identity| {
                identity.role == Role::Student
                    && identity.active
                    && !identity.verified
                    && identity.password_hash.starts_with("$argon2id$")
            })
            .times(1)
            .returning(|identity| Ok(identity));

        let service = service(
            repository,
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let command = RegisterCommand {
            email: EmailAddress::new("student@x.com".to_string()).unwrap(),
            password: Password::new("pw12345678".to_string()).unwrap(),
            display_name: DisplayName::new("Student".to_string()).unwrap(),
            role: None,
        };

        let identity = service.register(command).await.unwrap();
        assert_eq!(identity.role, Role::Student);
        assert_eq!(identity.email, "student@x.com");
    }

    fn admin_command(email: &str) -> RegisterCommand {
        RegisterCommand {
            email: EmailAddress::new(email.to_string()).unwrap(),
            password: Password::new("pw12345678".to_string()).unwrap(),
            display_name: DisplayName::new("Root".to_string()).unwrap(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_ensure_admin_creates_verified_admin() {
        let mut repository = MockTestCredentialRepository::new();
        repository.expect_find_by_email().returning(|_| Ok(None));
        repository
            .expect_insert()
            .withf(|identity| identity.role == Role::Admin && identity.verified && identity.active)
            .times(1)
            .returning(|identity| Ok(identity));

        let service = service(
            repository,
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let admin = service.ensure_admin(admin_command("root@x.com")).await.unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let mut existing = identity_with_password("pw12345678");
        existing.role = Role::Admin;
        let existing_id = existing.id;

        let service = service(
            repository_returning(existing),
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let admin = service.ensure_admin(admin_command("teacher@x.com")).await.unwrap();
        assert_eq!(admin.id, existing_id.to_string());
    }

    #[tokio::test]
    async fn test_ensure_admin_never_promotes_existing_account() {
        let service = service(
            repository_returning(identity_with_password("pw12345678")),
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let result = service.ensure_admin(admin_command("teacher@x.com")).await;
        assert!(matches!(result, Err(SessionError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let existing = identity_with_password("pw12345678");
        let mut repository = MockTestCredentialRepository::new();
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repository.expect_insert().times(0);

        let service = service(
            repository,
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let command = RegisterCommand {
            email: EmailAddress::new("teacher@x.com".to_string()).unwrap(),
            password: Password::new("pw12345678".to_string()).unwrap(),
            display_name: DisplayName::new("Teacher".to_string()).unwrap(),
            role: Some(Role::Teacher),
        };

        let result = service.register(command).await;
        assert!(matches!(result, Err(SessionError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_admin_role() {
        let mut repository = MockTestCredentialRepository::new();
        repository.expect_insert().times(0);

        let service = service(
            repository,
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let command = RegisterCommand {
            email: EmailAddress::new("root@x.com".to_string()).unwrap(),
            password: Password::new("pw12345678".to_string()).unwrap(),
            display_name: DisplayName::new("Root".to_string()).unwrap(),
            role: Some(Role::Admin),
        };

        let result = service.register(command).await;
        assert!(matches!(result, Err(SessionError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_login_issues_tokens_for_subject() {
        let identity = identity_with_password("pw12345678");
        let id = identity.id;
        let sessions = Arc::new(InMemorySessionStore::new());
        let service = service(
            repository_returning(identity),
            sessions.clone(),
            MockTestResetNotifier::new(),
        );

        let outcome = service.login("teacher@x.com", "pw12345678").await.unwrap();

        let claims = authenticator()
            .verify_token(&outcome.tokens.access_token, TokenKind::Access)
            .unwrap();
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.role, "teacher");
        assert_eq!(outcome.tokens.expires_in, 3600);

        let stored = sessions.get(&SessionKey::Refresh(id)).await.unwrap();
        assert_eq!(stored, Some(outcome.tokens.refresh_token));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let service = service(
            repository_returning(identity_with_password("pw12345678")),
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let result = service.login("teacher@x.com", "wrong-password").await;
        assert!(matches!(result, Err(SessionError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_unknown_and_inactive_are_indistinguishable() {
        let mut repository = MockTestCredentialRepository::new();
        repository.expect_find_by_email().returning(|_| Ok(None));
        let unknown = service(
            repository,
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        )
        .login("ghost@x.com", "pw12345678")
        .await
        .unwrap_err();

        let mut inactive_identity = identity_with_password("pw12345678");
        inactive_identity.active = false;
        let inactive = service(
            repository_returning(inactive_identity),
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        )
        .login("teacher@x.com", "pw12345678")
        .await
        .unwrap_err();

        assert!(matches!(unknown, SessionError::Unauthorized));
        assert!(matches!(inactive, SessionError::Unauthorized));
        assert_eq!(unknown.to_string(), inactive.to_string());
    }

    #[tokio::test]
    async fn test_login_unknown_email_still_verifies_a_hash() {
        let mut repository = MockTestCredentialRepository::new();
        repository.expect_find_by_email().returning(|_| Ok(None));
        let service = service(
            repository,
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );
        assert!(service.decoy_hash.get().is_none());

        let result = service.login("ghost@x.com", "pw12345678").await;

        assert!(matches!(result, Err(SessionError::Unauthorized)));
        let decoy = service.decoy_hash.get().expect("decoy hash was never verified");
        assert!(decoy.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_login_verifies_password_before_active_flag() {
        // An unreadable stored hash surfaces only if verification actually runs.
        let mut identity = identity_with_password("pw12345678");
        identity.active = false;
        identity.password_hash = "not-a-phc-string".to_string();
        let service = service(
            repository_returning(identity),
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let result = service.login("teacher@x.com", "pw12345678").await;
        assert!(matches!(result, Err(SessionError::Internal(_))));
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_rejects_superseded_token() {
        let identity = identity_with_password("pw12345678");
        let service = service(
            repository_returning(identity),
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let login = service.login("teacher@x.com", "pw12345678").await.unwrap();
        let first = login.tokens.refresh_token;

        let rotated = service.refresh(&first).await.unwrap();
        assert_ne!(rotated.refresh_token, first);

        let replay = service.refresh(&first).await;
        assert!(matches!(replay, Err(SessionError::Unauthorized)));

        assert!(service.refresh(&rotated.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_rejects_token_superseded_by_login() {
        let identity = identity_with_password("pw12345678");
        let service = service(
            repository_returning(identity),
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let first = service.login("teacher@x.com", "pw12345678").await.unwrap();
        let _second = service.login("teacher@x.com", "pw12345678").await.unwrap();

        let result = service.refresh(&first.tokens.refresh_token).await;
        assert!(matches!(result, Err(SessionError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let identity = identity_with_password("pw12345678");
        let service = service(
            repository_returning(identity),
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let login = service.login("teacher@x.com", "pw12345678").await.unwrap();

        let result = service.refresh(&login.tokens.access_token).await;
        assert!(matches!(result, Err(SessionError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_logout_revokes_prior_access_tokens_only() {
        let identity = identity_with_password("pw12345678");
        let service = service(
            repository_returning(identity),
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let before = service.login("teacher@x.com", "pw12345678").await.unwrap();
        let caller = service
            .authenticate(&before.tokens.access_token)
            .await
            .unwrap();

        service.logout(&caller.user_id).await.unwrap();
        service.logout(&caller.user_id).await.unwrap();

        assert!(matches!(
            service.authenticate(&before.tokens.access_token).await,
            Err(SessionError::Unauthorized)
        ));
        assert!(matches!(
            service.refresh(&before.tokens.refresh_token).await,
            Err(SessionError::Unauthorized)
        ));

        tokio::time::sleep(Duration::from_millis(5)).await;
        let after = service.login("teacher@x.com", "pw12345678").await.unwrap();
        assert!(service.authenticate(&after.tokens.access_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_is_revoked_compares_marker_with_issue_time() {
        let sessions = Arc::new(InMemorySessionStore::new());
        let id = UserId::new();
        sessions
            .set(&SessionKey::Blacklist(id), "1000", Duration::from_secs(60))
            .await
            .unwrap();

        let service = service(
            MockTestCredentialRepository::new(),
            sessions,
            MockTestResetNotifier::new(),
        );

        assert!(service.is_revoked(&id, 999).await.unwrap());
        assert!(service.is_revoked(&id, 1000).await.unwrap());
        assert!(!service.is_revoked(&id, 1001).await.unwrap());
        assert!(!service.is_revoked(&UserId::new(), 0).await.unwrap());
    }

    #[tokio::test]
    async fn test_validate_fails_closed_for_inactive_identity() {
        let mut identity = identity_with_password("pw12345678");
        identity.active = false;
        let id = identity.id;

        let service = service(
            repository_returning(identity),
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        assert!(matches!(
            service.validate(&id).await,
            Err(SessionError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_change_password_wrong_current_never_updates() {
        let identity = identity_with_password("pw12345678");
        let id = identity.id;
        let mut repository = repository_returning(identity);
        repository.expect_update_password_hash().times(0);

        let service = service(
            repository,
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let result = service
            .change_password(
                &id,
                "not-the-password",
                Password::new("new-password-1".to_string()).unwrap(),
            )
            .await;
        assert!(matches!(result, Err(SessionError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_change_password_drops_refresh_token() {
        let identity = identity_with_password("pw12345678");
        let id = identity.id;
        let mut repository = repository_returning(identity);
        repository
            .expect_update_password_hash()
            .withf(move |user_id, hash| *user_id == id && hash.starts_with("$argon2id$"))
            .times(1)
            .returning(|_, _| Ok(()));

        let sessions = Arc::new(InMemorySessionStore::new());
        let service = service(repository, sessions.clone(), MockTestResetNotifier::new());

        let login = service.login("teacher@x.com", "pw12345678").await.unwrap();
        service
            .change_password(
                &id,
                "pw12345678",
                Password::new("new-password-1".to_string()).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(sessions.get(&SessionKey::Refresh(id)).await.unwrap(), None);
        // Access tokens ride out their lifetime.
        assert!(service.authenticate(&login.tokens.access_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email_is_silent() {
        let mut repository = MockTestCredentialRepository::new();
        repository.expect_find_by_email().returning(|_| Ok(None));
        let mut notifier = MockTestResetNotifier::new();
        notifier.expect_send_reset_link().times(0);

        let service = service(repository, Arc::new(InMemorySessionStore::new()), notifier);

        assert!(service.forgot_password("ghost@x.com").await.is_ok());
        assert!(service.forgot_password("not an email").await.is_ok());
    }

    #[tokio::test]
    async fn test_forgot_password_survives_notifier_failure() {
        let identity = identity_with_password("pw12345678");
        let id = identity.id;
        let mut notifier = MockTestResetNotifier::new();
        notifier
            .expect_send_reset_link()
            .times(1)
            .returning(|_| Err(NotifierError::DeliveryFailed("broker down".to_string())));

        let sessions = Arc::new(InMemorySessionStore::new());
        let service = service(repository_returning(identity), sessions.clone(), notifier);

        assert!(service.forgot_password("teacher@x.com").await.is_ok());
        assert!(sessions
            .get(&SessionKey::Reset(id))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_reset_password_is_single_use() {
        let identity = identity_with_password("pw12345678");
        let id = identity.id;
        let mut repository = repository_returning(identity);
        repository
            .expect_update_password_hash()
            .times(1)
            .returning(|_, _| Ok(()));

        let captured = Arc::new(std::sync::Mutex::new(None::<String>));
        let sink = captured.clone();
        let mut notifier = MockTestResetNotifier::new();
        notifier.expect_send_reset_link().times(1).returning(move |event| {
            *sink.lock().unwrap() = Some(event.reset_token.clone());
            Ok(())
        });

        let sessions = Arc::new(InMemorySessionStore::new());
        let service = service(repository, sessions.clone(), notifier);

        service.login("teacher@x.com", "pw12345678").await.unwrap();
        service.forgot_password("teacher@x.com").await.unwrap();
        let token = captured.lock().unwrap().clone().unwrap();

        service
            .reset_password(&token, Password::new("brand-new-pw".to_string()).unwrap())
            .await
            .unwrap();

        let replay = service
            .reset_password(&token, Password::new("another-pw-1".to_string()).unwrap())
            .await;
        assert!(matches!(replay, Err(SessionError::Unauthorized)));
        assert_eq!(sessions.get(&SessionKey::Refresh(id)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reset_password_rejects_non_reset_token() {
        let identity = identity_with_password("pw12345678");
        let service = service(
            repository_returning(identity),
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let login = service.login("teacher@x.com", "pw12345678").await.unwrap();

        let result = service
            .reset_password(
                &login.tokens.refresh_token,
                Password::new("brand-new-pw".to_string()).unwrap(),
            )
            .await;
        assert!(matches!(result, Err(SessionError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_deactivation_locks_out_live_token() {
        let identity = identity_with_password("pw12345678");
        let id = identity.id;
        let mut repository = repository_returning(identity);
        repository
            .expect_update_active_flag()
            .with(eq(id), eq(false))
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(
            repository,
            Arc::new(InMemorySessionStore::new()),
            MockTestResetNotifier::new(),
        );

        let login = service.login("teacher@x.com", "pw12345678").await.unwrap();
        let updated = service.set_active(&id, false).await.unwrap();

        assert!(!updated.active);
        assert!(matches!(
            service.authenticate(&login.tokens.access_token).await,
            Err(SessionError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let identity = identity_with_password("pw12345678");
        let mut sessions = MockTestSessionStore::new();
        sessions
            .expect_set()
            .returning(|_, _, _| Err(StoreError::Backend("connection reset".to_string())));

        let service = SessionService::new(
            Arc::new(repository_returning(identity)),
            Arc::new(sessions),
            Arc::new(MockTestResetNotifier::new()),
            authenticator(),
        );

        let result = service.login("teacher@x.com", "pw12345678").await;
        assert!(matches!(result, Err(SessionError::Store(_))));
    }
}
