use thiserror::Error;

use crate::domain::identity::errors::StoreError;

/// Error for access resolution.
///
/// Unlike authentication failures, `Forbidden` names the policy set the
/// caller failed to satisfy.
#[derive(Debug, Clone, Error)]
pub enum AccessError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for AccessError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Missing(what) => AccessError::NotFound(what),
            StoreError::Duplicate(msg) | StoreError::Backend(msg) => AccessError::Store(msg),
        }
    }
}
