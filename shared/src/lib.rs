//! Shared utilities and common types for the account server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types (JWT signing, database, cache, environment, logging)
//! - Client-facing error response structures

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, CleanupConfig, DatabaseConfig, Environment, JwtConfig,
    LogFormat, LoggingConfig,
};
pub use errors::{error_codes, ApiResult, ErrorResponse, IntoErrorResponse};
