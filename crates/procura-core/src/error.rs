//! Error taxonomy for the portal.
//!
//! Every operation maps its failures onto this set; the gateway translates
//! each variant to an HTTP status and a `{ "message": ... }` body.

/// Portal-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// Missing or malformed input fields.
    #[error("{0}")]
    Validation(String),

    /// Missing/invalid token or bad credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate email, duplicate bid, and similar uniqueness failures.
    #[error("{0}")]
    Conflict(String),

    /// The entity exists but its state forbids the operation.
    #[error("{0}")]
    InvalidState(String),

    /// Unexpected storage or runtime failure.
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, PortalError>;

impl PortalError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
