use std::fmt;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Purpose a token was minted for.
///
/// Every token carries its kind so an access token can never be replayed
/// as a refresh token, and only reset tokens are accepted by reset flows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
    Reset,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
            TokenKind::Reset => f.write_str("reset"),
        }
    }
}

/// Claims bundle shared by access, refresh and reset tokens.
///
/// `iat` and `exp` are standard RFC 7519 second timestamps. `iat_ms` carries
/// the same instant in milliseconds so revocation cut-offs can be compared
/// without collapsing a logout and the next login into the same second.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// Subject (identity identifier)
    pub sub: String,

    pub email: String,

    pub role: String,

    /// Display name
    pub name: String,

    pub kind: TokenKind,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Issued at (Unix timestamp, milliseconds)
    pub iat_ms: i64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,

    /// Unique token identifier
    pub jti: String,
}

impl TokenClaims {
    /// Create claims of the given kind expiring after `ttl`.
    ///
    /// # Arguments
    /// * `kind` - Token purpose
    /// * `subject` - Identity identifier
    /// * `ttl` - Lifetime from now
    ///
    /// # Returns
    /// Claims with sub, kind, iat, iat_ms, exp and a fresh jti set
    pub fn issue(kind: TokenKind, subject: impl ToString, ttl: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + ttl;

        Self {
            sub: subject.to_string(),
            email: String::new(),
            role: String::new(),
            name: String::new(),
            kind,
            iat: now.timestamp(),
            iat_ms: now.timestamp_millis(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Set email.
    pub fn with_email(mut self, email: impl ToString) -> Self {
        self.email = email.to_string();
        self
    }

    /// Set role.
    pub fn with_role(mut self, role: impl ToString) -> Self {
        self.role = role.to_string();
        self
    }

    /// Set display name.
    pub fn with_name(mut self, name: impl ToString) -> Self {
        self.name = name.to_string();
        self
    }

    /// Re-mint the same identity payload as another kind with a new lifetime.
    pub fn reissue(&self, kind: TokenKind, ttl: Duration) -> Self {
        Self::issue(kind, &self.sub, ttl)
            .with_email(&self.email)
            .with_role(&self.role)
            .with_name(&self.name)
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }

    /// Seconds of validity left at `current_timestamp` (zero once expired).
    pub fn remaining_secs(&self, current_timestamp: i64) -> u64 {
        (self.exp - current_timestamp).max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_sets_lifetime() {
        let claims = TokenClaims::issue(TokenKind::Access, "user123", Duration::hours(1));

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 60 * 60);
        assert_eq!(claims.iat_ms / 1000, claims.iat);
    }

    #[test]
    fn test_issue_generates_distinct_jti() {
        let first = TokenClaims::issue(TokenKind::Refresh, "user123", Duration::days(7));
        let second = TokenClaims::issue(TokenKind::Refresh, "user123", Duration::days(7));

        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_builder_pattern() {
        let claims = TokenClaims::issue(TokenKind::Access, "user123", Duration::minutes(5))
            .with_email("alice@example.com")
            .with_role("teacher")
            .with_name("Alice");

        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, "teacher");
        assert_eq!(claims.name, "Alice");
    }

    #[test]
    fn test_reissue_keeps_identity_payload() {
        let access = TokenClaims::issue(TokenKind::Access, "user123", Duration::hours(1))
            .with_email("alice@example.com")
            .with_role("student")
            .with_name("Alice");

        let refresh = access.reissue(TokenKind::Refresh, Duration::days(7));

        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert_eq!(refresh.sub, access.sub);
        assert_eq!(refresh.email, access.email);
        assert_eq!(refresh.role, access.role);
        assert_ne!(refresh.jti, access.jti);
    }

    #[test]
    fn test_is_expired() {
        let mut claims = TokenClaims::issue(TokenKind::Reset, "user123", Duration::hours(1));
        claims.exp = 1000;

        assert!(!claims.is_expired(999));
        assert!(!claims.is_expired(1000));
        assert!(claims.is_expired(1001));
        assert_eq!(claims.remaining_secs(1001), 0);
        assert_eq!(claims.remaining_secs(900), 100);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let value = serde_json::to_value(TokenKind::Refresh).unwrap();
        assert_eq!(value, serde_json::json!("refresh"));
    }
}
