//! Maintenance process that purges expired refresh tokens from MySQL.
//!
//! Usage: `token-cleanup [--once]`. Without `--once` it runs on the
//! configured interval until interrupted.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use acct_core::services::token::{TokenCleanupConfig, TokenCleanupService};
use acct_infra::database::{DatabasePool, MySqlTokenRepository};
use acct_infra::telemetry::init_tracing;
use acct_shared::config::{AppConfig, Environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // environment-specific file first; dotenvy never overwrites a set variable
    dotenvy::from_filename(Environment::from_env().env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging).context("failed to initialize logging")?;

    let run_once = std::env::args().any(|arg| arg == "--once");
    info!(environment = %config.environment, run_once, "Starting token cleanup");

    let pool = DatabasePool::new(config.database.clone())
        .await
        .context("failed to connect to the token database")?;
    if !pool.health_check().await.context("token database health check failed")? {
        anyhow::bail!("token database health check returned an unexpected value");
    }
    info!(stats = %pool.get_statistics(), "Token database ready");

    let repository = Arc::new(MySqlTokenRepository::new(pool.get_pool().clone()));
    let service = Arc::new(TokenCleanupService::new(
        repository,
        TokenCleanupConfig::from(&config.cleanup),
    ));

    if run_once {
        let result = service.run_cleanup().await?;
        info!(
            deleted = result.expired_tokens_deleted,
            errors = result.errors.len(),
            "Cleanup finished"
        );
        pool.close().await;
        if !result.is_success() {
            anyhow::bail!("cleanup completed with errors: {:?}", result.errors);
        }
        return Ok(());
    }

    let Some(handle) = service.start_background_task() else {
        pool.close().await;
        return Ok(());
    };

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown requested");
    handle.abort();
    pool.close().await;
    Ok(())
}
