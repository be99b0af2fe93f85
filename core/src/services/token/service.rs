//! Token service facade
//!
//! Wires one key ring and one repository into the issuer, validator and
//! rotator, and exposes the operations collaborators call.

use std::sync::Arc;

use tracing::info;

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::UserId;
use crate::errors::{DomainResult, TokenError};
use crate::repositories::TokenRepository;

use super::config::TokenServiceConfig;
use super::issuer::TokenIssuer;
use super::key_manager::SigningKeys;
use super::rotator::TokenRotator;
use super::store::bounded;
use super::validator::TokenValidator;

/// Service for managing session credentials
pub struct TokenService<R: TokenRepository> {
    repository: Arc<R>,
    config: Arc<TokenServiceConfig>,
    issuer: TokenIssuer<R>,
    validator: TokenValidator,
    rotator: TokenRotator<R>,
}

impl<R: TokenRepository> Clone for TokenService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            config: Arc::clone(&self.config),
            issuer: self.issuer.clone(),
            validator: self.validator.clone(),
            rotator: self.rotator.clone(),
        }
    }
}

impl<R: TokenRepository> TokenService<R> {
    /// Creates a new token service, loading keys from the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(TokenService)` - Service ready to use
    /// * `Err(DomainError::Validation)` - Invalid lifetimes or secrets
    /// * `Err(DomainError::Token(TokenError::KeyLoad))` - Key material could not be loaded
    pub fn new(repository: Arc<R>, config: TokenServiceConfig) -> DomainResult<Self> {
        config.validate()?;
        let keys = Arc::new(config.load_keys()?);
        info!(
            algorithm = ?keys.algorithm(),
            previous_keys = keys.previous_key_count(),
            "Token service initialized"
        );
        Ok(Self::with_keys(repository, config, keys))
    }

    /// Creates a token service around an already loaded key ring
    pub fn with_keys(repository: Arc<R>, config: TokenServiceConfig, keys: Arc<SigningKeys>) -> Self {
        let config = Arc::new(config);
        let issuer = TokenIssuer::new(Arc::clone(&repository), Arc::clone(&keys), Arc::clone(&config));
        let validator = TokenValidator::new(keys, &config);
        let rotator = TokenRotator::new(Arc::clone(&repository), issuer.clone(), Arc::clone(&config));

        Self {
            repository,
            config,
            issuer,
            validator,
            rotator,
        }
    }

    /// Issues a new token pair after a successful login
    pub async fn issue(&self, user_id: UserId) -> DomainResult<TokenPair> {
        self.issuer.issue(user_id).await
    }

    /// Validates an access token; never touches the store
    pub fn validate(&self, access_token: &str) -> Result<UserId, TokenError> {
        self.validator.validate(access_token)
    }

    /// Validates the credential of an `Authorization` header value
    pub fn authenticate_bearer(&self, header_value: &str) -> Result<UserId, TokenError> {
        self.validator.authenticate_bearer(header_value)
    }

    /// Exchanges a refresh token for a new pair
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        self.rotator.refresh(refresh_token).await
    }

    /// Revokes one refresh token
    pub async fn revoke(&self, refresh_token: &str) -> DomainResult<bool> {
        self.rotator.revoke(refresh_token).await
    }

    /// Revokes every refresh token of a user
    pub async fn revoke_all(&self, user_id: UserId) -> DomainResult<usize> {
        self.rotator.revoke_all(user_id).await
    }

    /// Removes expired tokens from storage
    pub async fn cleanup_expired_tokens(&self) -> DomainResult<usize> {
        bounded(
            self.config.store_timeout,
            "delete_expired_tokens",
            self.repository.delete_expired_tokens(),
        )
        .await
    }

    pub fn issuer(&self) -> &TokenIssuer<R> {
        &self.issuer
    }

    /// Validator handle for request workers; cheap to clone
    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    pub fn rotator(&self) -> &TokenRotator<R> {
        &self.rotator
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }
}
