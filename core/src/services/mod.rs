//! Domain services

pub mod token;

pub use token::{
    extract_bearer_token, CleanupResult, KeySource, SigningKeys, TokenCleanupConfig,
    TokenCleanupService, TokenIssuer, TokenRotator, TokenService, TokenServiceConfig,
    TokenValidator,
};
