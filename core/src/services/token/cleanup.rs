//! Periodic removal of expired refresh token records
//!
//! Expired records are already rejected by the rotator, so this is
//! housekeeping that keeps the store small.

use std::sync::Arc;
use std::time::Duration;

use acct_shared::config::CleanupConfig;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::TokenRepository;

/// Configuration for token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
    /// Upper bound for one delete call
    pub store_timeout: Duration,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            enabled: true,
            store_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&CleanupConfig> for TokenCleanupConfig {
    fn from(config: &CleanupConfig) -> Self {
        Self {
            interval_seconds: config.interval_seconds,
            enabled: config.enabled,
            ..Default::default()
        }
    }
}

/// Service for cleaning up expired refresh tokens
pub struct TokenCleanupService<R: TokenRepository + 'static> {
    repository: Arc<R>,
    config: TokenCleanupConfig,
}

impl<R: TokenRepository + 'static> TokenCleanupService<R> {
    /// Create a new token cleanup service
    pub fn new(repository: Arc<R>, config: TokenCleanupConfig) -> Self {
        Self { repository, config }
    }

    /// Run a single cleanup cycle
    ///
    /// A store failure is recorded in the result rather than returned, so
    /// the background loop keeps going.
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        info!("Starting token cleanup cycle");

        let mut result = CleanupResult::default();

        match tokio::time::timeout(self.config.store_timeout, self.repository.delete_expired_tokens()).await {
            Ok(Ok(count)) => {
                result.expired_tokens_deleted = count;
                info!(deleted = count, "Deleted expired refresh tokens");
            }
            Ok(Err(e)) => {
                error!(error = %e, "Failed to cleanup expired tokens");
                result.errors.push(format!("Token cleanup error: {}", e));
            }
            Err(_) => {
                error!(timeout_secs = self.config.store_timeout.as_secs(), "Token cleanup timed out");
                result.errors.push("Token cleanup timed out".to_string());
            }
        }

        Ok(result)
    }

    /// Start the cleanup service as a background task
    ///
    /// Returns `None` when cleanup is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Token cleanup service is disabled");
            return None;
        }

        let interval = Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                "Token cleanup service started"
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.is_success() {
                            warn!(errors = ?result.errors, "Cleanup completed with errors");
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Token cleanup cycle failed");
                    }
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of expired refresh tokens deleted
    pub expired_tokens_deleted: usize,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::token::RefreshToken;
    use crate::domain::entities::user::UserId;
    use crate::repositories::MockTokenRepository;
    use chrono::Utc;

    async fn seeded_repository() -> Arc<MockTokenRepository> {
        let repo = Arc::new(MockTokenRepository::new());
        let now = Utc::now();
        repo.seed(RefreshToken::new(UserId::new(1), "live".into(), now, chrono::Duration::days(1)))
            .await;
        repo.seed(RefreshToken::new(UserId::new(1), "old-1".into(), now, chrono::Duration::seconds(-10)))
            .await;
        repo.seed(RefreshToken::new(UserId::new(2), "old-2".into(), now, chrono::Duration::hours(-1)))
            .await;
        repo
    }

    #[tokio::test]
    async fn test_run_cleanup_deletes_only_expired() {
        let repo = seeded_repository().await;
        let service = TokenCleanupService::new(repo.clone(), TokenCleanupConfig::default());

        let result = service.run_cleanup().await.unwrap();

        assert!(result.is_success());
        assert_eq!(result.expired_tokens_deleted, 2);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_disabled_cleanup_is_noop() {
        let repo = seeded_repository().await;
        let config = TokenCleanupConfig {
            enabled: false,
            ..Default::default()
        };
        let service = Arc::new(TokenCleanupService::new(repo.clone(), config));

        let result = service.run_cleanup().await.unwrap();
        assert_eq!(result.expired_tokens_deleted, 0);
        assert_eq!(repo.len().await, 3);
        assert!(service.start_background_task().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_is_reported_not_returned() {
        let repo = seeded_repository().await;
        repo.delay_calls(Duration::from_secs(120));
        let config = TokenCleanupConfig {
            store_timeout: Duration::from_secs(1),
            ..Default::default()
        };
        let service = TokenCleanupService::new(repo, config);

        let result = service.run_cleanup().await.unwrap();
        assert!(!result.is_success());
        assert_eq!(result.expired_tokens_deleted, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_task_runs_first_cycle() {
        let repo = seeded_repository().await;
        let service = Arc::new(TokenCleanupService::new(repo.clone(), TokenCleanupConfig::default()));

        let handle = service.start_background_task().unwrap();
        // first tick fires immediately
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(repo.len().await, 1);
        handle.abort();
    }

    #[test]
    fn test_from_shared_config() {
        let shared = CleanupConfig {
            interval_seconds: 60,
            enabled: false,
        };
        let config = TokenCleanupConfig::from(&shared);
        assert_eq!(config.interval_seconds, 60);
        assert!(!config.enabled);
    }
}
