//! Time-bounded store calls

use std::future::Future;
use std::time::Duration;

use tracing::error;

use crate::errors::{DomainError, DomainResult};

/// Runs one repository call, turning an elapsed deadline into a
/// persistence fault
pub(crate) async fn bounded<T, F>(limit: Duration, operation: &'static str, call: F) -> DomainResult<T>
where
    F: Future<Output = DomainResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            error!(operation, timeout_ms = limit.as_millis() as u64, "Token store call timed out");
            Err(DomainError::persistence(format!(
                "{} timed out after {}ms",
                operation,
                limit.as_millis()
            )))
        }
    }
}
