//! Session token and password primitives.
//!
//! Provides the building blocks the session service composes:
//! - Password hashing (Argon2id)
//! - Signed, kind-tagged session tokens (HS256 JWT)
//! - An `Authenticator` that mints access/refresh/reset tokens with
//!   configured lifetimes
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{Authenticator, TokenClaims, TokenKind, TokenLifetimes};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     TokenLifetimes::default(),
//! )
//! .unwrap();
//!
//! let identity = TokenClaims::issue(TokenKind::Access, "user123", Duration::zero())
//!     .with_email("alice@example.com")
//!     .with_role("student");
//! let pair = auth.issue_pair(&identity).unwrap();
//!
//! let claims = auth.verify_token(&pair.access_token, TokenKind::Access).unwrap();
//! assert_eq!(claims.sub, "user123");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

pub use authenticator::Authenticator;
pub use authenticator::SignedToken;
pub use authenticator::TokenLifetimes;
pub use authenticator::TokenPair;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenClaims;
pub use jwt::TokenKind;
pub use password::PasswordError;
pub use password::PasswordHasher;
