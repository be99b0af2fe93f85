//! Credential error taxonomy
//!
//! Sub-cases are kept distinct here for logging and tests. Clients only ever
//! see the collapsed form produced by `IntoErrorResponse`.

use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Malformed token")]
    Malformed,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Key load error: {message}")]
    KeyLoad { message: String },
}

impl TokenError {
    /// Whether this error should be answered with "unauthenticated"
    pub fn is_rejection(&self) -> bool {
        !matches!(self, TokenError::KeyLoad { .. })
    }
}
