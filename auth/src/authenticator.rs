use chrono::Duration;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenClaims;
use crate::jwt::TokenKind;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Token lifetimes used when minting session tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
    pub reset: Duration,
}

impl TokenLifetimes {
    pub fn lifetime_of(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access,
            TokenKind::Refresh => self.refresh,
            TokenKind::Reset => self.reset,
        }
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::hours(1),
            refresh: Duration::days(7),
            reset: Duration::hours(1),
        }
    }
}

/// Freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_claims: TokenClaims,
    pub refresh_claims: TokenClaims,
}

/// A signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Authentication coordinator combining password hashing and token signing.
///
/// Holds the process-wide signing key; construct once at startup and share.
#[derive(Clone)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    lifetimes: TokenLifetimes,
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `lifetimes` - Access, refresh and reset token lifetimes
    ///
    /// # Errors
    /// * `WeakSecret` - Secret shorter than 32 bytes
    pub fn new(jwt_secret: &[u8], lifetimes: TokenLifetimes) -> Result<Self, JwtError> {
        Ok(Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret)?,
            lifetimes,
        })
    }

    /// Replace the password hasher (e.g. cheaper parameters for tests).
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    pub fn password_hasher(&self) -> PasswordHasher {
        self.password_hasher.clone()
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored hash.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Mint an access token and a refresh token from the same identity claims.
    ///
    /// # Arguments
    /// * `identity` - Claims template; its kind, timestamps and jti are replaced
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_pair(&self, identity: &TokenClaims) -> Result<TokenPair, JwtError> {
        let access = self.issue(identity, TokenKind::Access)?;
        let refresh = self.issue(identity, TokenKind::Refresh)?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_claims: access.claims,
            refresh_claims: refresh.claims,
        })
    }

    /// Mint a single token of `kind` using the configured lifetime for that kind.
    pub fn issue(&self, identity: &TokenClaims, kind: TokenKind) -> Result<SignedToken, JwtError> {
        let claims = identity.reissue(kind, self.lifetimes.lifetime_of(kind));
        let token = self.jwt_handler.encode(&claims)?;
        Ok(SignedToken { token, claims })
    }

    /// Verify signature, expiry and kind of a presented token.
    pub fn verify_token(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, JwtError> {
        self.jwt_handler.decode(token, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn authenticator() -> Authenticator {
        Authenticator::new(SECRET, TokenLifetimes::default())
            .unwrap()
            .with_password_hasher(PasswordHasher::with_params(1024, 1, 1).unwrap())
    }

    fn identity() -> TokenClaims {
        TokenClaims::issue(TokenKind::Access, "user123", Duration::zero())
            .with_email("alice@example.com")
            .with_role("teacher")
            .with_name("Alice")
    }

    #[test]
    fn test_issue_pair_uses_configured_lifetimes() {
        let pair = authenticator().issue_pair(&identity()).unwrap();

        assert_eq!(pair.access_claims.kind, TokenKind::Access);
        assert_eq!(pair.refresh_claims.kind, TokenKind::Refresh);
        assert_eq!(pair.access_claims.exp - pair.access_claims.iat, 3600);
        assert_eq!(
            pair.refresh_claims.exp - pair.refresh_claims.iat,
            7 * 24 * 3600
        );
        assert_ne!(pair.access_token, pair.refresh_token);
    }

    #[test]
    fn test_verify_round_trip_by_kind() {
        let authenticator = authenticator();
        let pair = authenticator.issue_pair(&identity()).unwrap();

        let access = authenticator
            .verify_token(&pair.access_token, TokenKind::Access)
            .unwrap();
        assert_eq!(access.sub, "user123");
        assert_eq!(access.role, "teacher");

        assert!(authenticator
            .verify_token(&pair.access_token, TokenKind::Refresh)
            .is_err());
    }

    #[test]
    fn test_password_round_trip() {
        let authenticator = authenticator();
        let hash = authenticator.hash_password("pw12345678").unwrap();

        assert!(authenticator.verify_password("pw12345678", &hash).unwrap());
        assert!(!authenticator.verify_password("pw87654321", &hash).unwrap());
    }

    #[test]
    fn test_rejects_weak_secret() {
        let result = Authenticator::new(b"too-short", TokenLifetimes::default());
        assert!(matches!(result, Err(JwtError::WeakSecret { .. })));
    }
}
