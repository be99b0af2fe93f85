//! Domain-specific error types and error handling.

mod types;

pub use types::TokenError;

use acct_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

/// Message returned for every rejected credential, whatever the sub-case
pub const AUTHENTICATION_FAILED: &str = "Authentication failed";

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Store fault with a message
    pub fn persistence(message: impl Into<String>) -> Self {
        DomainError::Persistence {
            message: message.into(),
        }
    }

    /// True when the caller should answer "unauthenticated"
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, DomainError::Token(e) if e.is_rejection())
    }

    /// The token sub-case, if this is a token error
    pub fn token_error(&self) -> Option<&TokenError> {
        match self {
            DomainError::Token(e) => Some(e),
            _ => None,
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        if self.is_unauthenticated() {
            return ErrorResponse::unauthorized(AUTHENTICATION_FAILED);
        }

        match self {
            DomainError::Validation { .. } => {
                ErrorResponse::new(error_codes::BAD_REQUEST, "Invalid request", 400)
            }
            DomainError::Persistence { .. } => ErrorResponse::new(
                error_codes::SERVICE_UNAVAILABLE,
                "Session store unavailable, please sign in again",
                503,
            ),
            _ => ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred", 500),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
