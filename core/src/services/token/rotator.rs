//! Refresh token rotation
//!
//! A refresh record moves `Live -> Consumed` exactly once. The consuming
//! step is the store's conditional delete: only the caller that actually
//! removed the record may mint a new pair.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::UserId;
use crate::errors::{DomainResult, TokenError};
use crate::repositories::TokenRepository;

use super::config::TokenServiceConfig;
use super::issuer::{hash_token, TokenIssuer};
use super::store::bounded;

/// Exchanges refresh tokens for fresh pairs
pub struct TokenRotator<R: TokenRepository> {
    repository: Arc<R>,
    issuer: TokenIssuer<R>,
    config: Arc<TokenServiceConfig>,
}

impl<R: TokenRepository> Clone for TokenRotator<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            issuer: self.issuer.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R: TokenRepository> TokenRotator<R> {
    pub fn new(repository: Arc<R>, issuer: TokenIssuer<R>, config: Arc<TokenServiceConfig>) -> Self {
        Self {
            repository,
            issuer,
            config,
        }
    }

    /// Refreshes tokens using a refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - New pair; the presented token is no longer usable
    /// * `Err(TokenError::InvalidRefreshToken)` - Unknown, expired or already consumed
    /// * `Err(DomainError::Persistence)` - The lookup failed or timed out
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        self.refresh_at(refresh_token, Utc::now()).await
    }

    pub(crate) async fn refresh_at(&self, refresh_token: &str, now: DateTime<Utc>) -> DomainResult<TokenPair> {
        if refresh_token.is_empty() {
            warn!("Rejected refresh: empty token");
            return Err(TokenError::InvalidRefreshToken.into());
        }

        let token_hash = hash_token(refresh_token);
        let timeout = self.config.store_timeout;

        let found = bounded(timeout, "find_refresh_token", self.repository.find_refresh_token(&token_hash))
            .await
            .map_err(|e| {
                error!(error = %e, "Refresh token lookup failed");
                e
            })?;

        let record = match found {
            Some(record) if !record.is_expired_at(now) => record,
            Some(expired) => {
                warn!(user_id = %expired.user_id, "Rejected refresh: token expired");
                // best effort, the cleanup task removes it otherwise
                if let Err(e) = bounded(timeout, "delete_refresh_token", self.repository.delete_refresh_token(&token_hash)).await {
                    warn!(error = %e, "Failed to delete expired refresh token");
                }
                return Err(TokenError::InvalidRefreshToken.into());
            }
            None => {
                warn!("Rejected refresh: unknown token");
                return Err(TokenError::InvalidRefreshToken.into());
            }
        };

        match bounded(timeout, "delete_refresh_token", self.repository.delete_refresh_token(&token_hash)).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = %record.user_id, "Rejected refresh: token consumed by a concurrent rotation");
                return Err(TokenError::InvalidRefreshToken.into());
            }
            Err(e) => {
                error!(user_id = %record.user_id, error = %e, "Failed to consume refresh token");
                return Err(TokenError::InvalidRefreshToken.into());
            }
        }

        let pair = self.issuer.issue_at(record.user_id, now).await?;
        info!(user_id = %record.user_id, "Rotated refresh token");
        Ok(pair)
    }

    /// Revokes a single refresh token (logout)
    ///
    /// Returns `true` when a record was removed.
    pub async fn revoke(&self, refresh_token: &str) -> DomainResult<bool> {
        let removed = bounded(
            self.config.store_timeout,
            "delete_refresh_token",
            self.repository.delete_refresh_token(&hash_token(refresh_token)),
        )
        .await?;

        if removed {
            info!("Revoked refresh token");
        }
        Ok(removed)
    }

    /// Revokes every refresh token of a user (logout everywhere)
    pub async fn revoke_all(&self, user_id: UserId) -> DomainResult<usize> {
        let removed = bounded(
            self.config.store_timeout,
            "delete_user_tokens",
            self.repository.delete_user_tokens(user_id),
        )
        .await?;

        info!(%user_id, removed, "Revoked all refresh tokens for user");
        Ok(removed)
    }
}
