//! # Infrastructure Layer
//!
//! Concrete implementations behind the core's `TokenRepository` port plus
//! the process plumbing the services need at startup.
//!
//! ## Architecture
//!
//! - **Database**: MySQL refresh token store using SQLx, with pooled connections and migrations
//! - **Cache**: Redis refresh token store with native key expiry
//! - **Memory**: in-process store for tests and single-node development
//! - **Telemetry**: `tracing` subscriber bootstrap

use acct_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Cache module - Redis connection and token store
pub mod cache;

/// In-memory token store
pub mod memory;

/// Logging bootstrap
pub mod telemetry;

pub use cache::{RedisClient, RedisTokenRepository};
pub use database::{DatabasePool, MySqlTokenRepository, PoolStatistics};
pub use memory::InMemoryTokenRepository;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Stored record could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Config(message) => DomainError::Validation { message },
            other => DomainError::Persistence {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_become_persistence_faults() {
        let error: DomainError = InfrastructureError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(error, DomainError::Persistence { .. }));

        let error: DomainError = InfrastructureError::Config("bad url".to_string()).into();
        assert!(matches!(error, DomainError::Validation { .. }));
    }
}
