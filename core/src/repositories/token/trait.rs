//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;

use crate::domain::entities::token::RefreshToken;
use crate::domain::entities::user::UserId;
use crate::errors::DomainError;

/// Repository trait for RefreshToken persistence
///
/// Records are keyed by `token_hash`, the SHA-256 digest of the opaque
/// string given to the client. Implementations must never return raw token
/// strings because they never receive them.
///
/// # Atomicity
/// `delete_refresh_token` is the rotation gate: for any given hash, at most
/// one concurrent caller may observe `Ok(true)`. SQL stores get this from a
/// single `DELETE` and its affected-row count, key-value stores from a
/// native delete that reports whether the key existed.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Insert a new refresh token record
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The stored record
    /// * `Err(DomainError::Validation)` - A record with the same hash already exists
    /// * `Err(DomainError::Persistence)` - Store failure; nothing was written
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use acct_core::domain::entities::{RefreshToken, UserId};
    /// # use acct_core::repositories::TokenRepository;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let record = RefreshToken::new(UserId::new(42), "sha256_hex".to_string(), Utc::now(), Duration::days(7));
    /// let saved = repo.insert_refresh_token(record).await?;
    /// println!("Stored refresh token {}", saved.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn insert_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its hashed value
    ///
    /// # Returns
    /// * `Ok(Some(RefreshToken))` - Token found (it may still be expired)
    /// * `Ok(None)` - No record with this hash
    /// * `Err(DomainError)` - Store failure
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Delete a refresh token if it exists
    ///
    /// # Returns
    /// * `Ok(true)` - This call removed the record
    /// * `Ok(false)` - No record was present (never existed or already consumed)
    /// * `Err(DomainError)` - Store failure
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<bool, DomainError>;

    /// Delete every refresh token belonging to a user
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records removed
    async fn delete_user_tokens(&self, user_id: UserId) -> Result<usize, DomainError>;

    /// Delete records whose `expires_at` has passed
    ///
    /// Called periodically by the cleanup service. Stores with native
    /// expiry may return `Ok(0)`.
    async fn delete_expired_tokens(&self) -> Result<usize, DomainError>;
}
