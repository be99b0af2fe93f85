//! Configuration module with per-concern sub-modules
//!
//! - `auth` - JWT signing keys and token lifetimes
//! - `cache` - Redis connection for the Redis-backed token store
//! - `database` - MySQL pool for the SQL-backed token store
//! - `environment` - Environment detection and logging configuration

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;

use serde::{Deserialize, Serialize};

pub use auth::{AuthConfig, JwtConfig};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Background cleanup of expired refresh tokens
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    /// How often to run cleanup, in seconds
    pub interval_seconds: u64,

    /// Whether the cleanup task runs at all
    pub enabled: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            enabled: true,
        }
    }
}

impl CleanupConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            interval_seconds: std::env::var("TOKEN_CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.interval_seconds),
            enabled: std::env::var("TOKEN_CLEANUP_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.enabled),
        }
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Expired token cleanup
    #[serde(default)]
    pub cleanup: CleanupConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();

        Self {
            environment,
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            auth: AuthConfig::from_env(),
            cleanup: CleanupConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_config_default() {
        let config = CleanupConfig::default();
        assert_eq!(config.interval_seconds, 3600);
        assert!(config.enabled);
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.auth.jwt.algorithm, "HS256");
        assert!(config.auth.jwt.refresh_token_expiry > config.auth.jwt.access_token_expiry);
    }
}
