//! Logging bootstrap

use acct_shared::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::InfrastructureError;

/// Installs the global `tracing` subscriber described by `config`
///
/// `config.level` is a full `EnvFilter` directive, so `info,sqlx=warn` works.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let env_filter = EnvFilter::try_new(&config.level)
        .map_err(|e| InfrastructureError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let layer = fmt::layer()
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format {
        LogFormat::Json => registry.with(layer.json().with_ansi(false)).try_init(),
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
    };

    result.map_err(|e| InfrastructureError::Config(format!("Failed to install tracing subscriber: {}", e)))
}

/// Quiet subscriber for tests; safe to call from every test
pub fn init_test_tracing() {
    let filter = std::env::var("TEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .without_time()
        .try_init()
        .ok();
}
