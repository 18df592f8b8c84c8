use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::identity::errors::DisplayNameError;
use crate::domain::identity::errors::EmailError;
use crate::domain::identity::errors::PasswordPolicyError;
use crate::domain::identity::errors::RoleError;
use crate::domain::identity::errors::UserIdError;

/// Identity aggregate.
///
/// A registered account. Never deleted, only deactivated.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: UserId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub role: Role,
    pub display_name: DisplayName,
    pub active: bool,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Claims template used when minting tokens for this identity.
    pub fn token_claims(&self) -> auth::TokenClaims {
        auth::TokenClaims::issue(auth::TokenKind::Access, self.id, chrono::Duration::zero())
            .with_email(self.email.as_str())
            .with_role(self.role)
            .with_name(self.display_name.as_str())
    }
}

/// Identity unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Student
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            other => Err(RoleError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Email address type
///
/// Validated with an RFC 5322 parser and stored lowercased, so lookups are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let normalized = email.trim().to_lowercase();
        email_address::EmailAddress::from_str(&normalized)
            .map(|_| EmailAddress(normalized))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name shown to other users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MAX_LENGTH: usize = 100;

    /// Create a new display name.
    ///
    /// # Errors
    /// * `Empty` - Name is blank
    /// * `TooLong` - Name exceeds 100 characters
    pub fn new(name: String) -> Result<Self, DisplayNameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();
        if length == 0 {
            Err(DisplayNameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password that satisfies the length policy.
///
/// Only ever lives long enough to be hashed.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;
    const MAX_LENGTH: usize = 128;

    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    /// * `TooLong` - More than 128 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(PasswordPolicyError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(password))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Session-store key namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// The single currently valid refresh token
    Refresh(UserId),
    /// Revocation marker (millisecond timestamp)
    Blacklist(UserId),
    /// Outstanding password reset token
    Reset(UserId),
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKey::Refresh(id) => write!(f, "refresh:{}", id),
            SessionKey::Blacklist(id) => write!(f, "blacklist:{}", id),
            SessionKey::Reset(id) => write!(f, "reset:{}", id),
        }
    }
}

/// Command to register a new identity with validated fields.
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: Password,
    pub display_name: DisplayName,
    pub role: Option<Role>,
}

/// Identity as seen by callers; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicIdentity {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub active: bool,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for PublicIdentity {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.to_string(),
            email: identity.email.as_str().to_string(),
            display_name: identity.display_name.as_str().to_string(),
            role: identity.role,
            active: identity.active,
            verified: identity.verified,
            created_at: identity.created_at,
        }
    }
}

/// Identity resolved from a verified, unrevoked access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub display_name: String,
    pub issued_at_ms: i64,
}

/// Access/refresh pair handed back by login and refresh.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub tokens: SessionTokens,
    pub identity: PublicIdentity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalized() {
        let email = EmailAddress::new("  Teacher@X.com ".to_string()).unwrap();
        assert_eq!(email.as_str(), "teacher@x.com");
    }

    #[test]
    fn test_email_rejects_garbage() {
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!(matches!(
            "superuser".parse::<Role>(),
            Err(RoleError::Unknown(_))
        ));
    }

    #[test]
    fn test_password_policy() {
        assert!(Password::new("pw12345678".to_string()).is_ok());
        assert!(matches!(
            Password::new("short".to_string()),
            Err(PasswordPolicyError::TooShort { min: 8, actual: 5 })
        ));
        assert!(matches!(
            Password::new("x".repeat(129)),
            Err(PasswordPolicyError::TooLong { .. })
        ));
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("pw12345678".to_string()).unwrap();
        assert_eq!(format!("{:?}", password), "Password(***)");
    }

    #[test]
    fn test_display_name_limits() {
        assert!(matches!(
            DisplayName::new("   ".to_string()),
            Err(DisplayNameError::Empty)
        ));
        assert!(DisplayName::new("Ada".to_string()).is_ok());
        assert!(DisplayName::new("a".repeat(101)).is_err());
    }

    #[test]
    fn test_session_key_namespaces() {
        let id = UserId::new();
        assert_eq!(SessionKey::Refresh(id).to_string(), format!("refresh:{}", id));
        assert_eq!(
            SessionKey::Blacklist(id).to_string(),
            format!("blacklist:{}", id)
        );
        assert_eq!(SessionKey::Reset(id).to_string(), format!("reset:{}", id));
    }
}
