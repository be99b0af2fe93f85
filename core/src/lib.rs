//! # Account Server Core
//!
//! Session credential management for the account server: issuing signed
//! access tokens and store-tracked refresh tokens, validating access tokens
//! without touching the store, and rotating refresh tokens one use at a time.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{Claims, RefreshToken, TokenPair, UserId};
pub use errors::{DomainError, DomainResult, TokenError};
pub use repositories::TokenRepository;
pub use services::{TokenCleanupService, TokenService, TokenServiceConfig};
