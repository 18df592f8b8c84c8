use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisplayNameError {
    #[error("Display name is empty")]
    Empty,

    #[error("Display name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0}")]
    Unknown(String),
}

/// Failure reported by an external store (credential, session or course).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record already exists: {0}")]
    Duplicate(String),

    #[error("Record not found: {0}")]
    Missing(String),

    #[error("Store unavailable: {0}")]
    Backend(String),
}

/// Error for notification delivery
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    #[error("Failed to serialize notification: {0}")]
    SerializationFailed(String),

    #[error("Failed to deliver notification: {0}")]
    DeliveryFailed(String),
}

/// Top-level error for session lifecycle operations.
///
/// `Unauthorized` deliberately carries no detail: callers must not learn
/// which authentication check failed.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Invalid credentials or session")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Email already registered: {0}")]
    Conflict(String),

    #[error("Identity not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    // Infrastructure errors
    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => SessionError::Conflict(what),
            StoreError::Missing(what) => SessionError::NotFound(what),
            StoreError::Backend(msg) => SessionError::Store(msg),
        }
    }
}

impl From<auth::JwtError> for SessionError {
    fn from(err: auth::JwtError) -> Self {
        SessionError::Internal(format!("Token generation failed: {}", err))
    }
}
