//! Token service module for session credentials
//!
//! This module handles all token-related operations including:
//! - JWT access token issuance and validation
//! - Refresh token rotation and revocation
//! - Signing key rings with verify-only previous keys
//! - Background cleanup of expired tokens

mod cleanup;
mod config;
mod issuer;
mod key_manager;
mod rotator;
mod service;
mod store;
mod validator;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use config::{KeySource, TokenServiceConfig, MAX_TOKEN_TTL_DAYS};
pub use issuer::TokenIssuer;
pub use key_manager::SigningKeys;
pub use rotator::TokenRotator;
pub use service::TokenService;
pub use validator::{extract_bearer_token, TokenValidator};
