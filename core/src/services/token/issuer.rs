//! Token issuance: signed access token plus a stored refresh token

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Header};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{error, info};

use crate::domain::entities::token::{Claims, RefreshToken, TokenPair};
use crate::domain::entities::user::UserId;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::TokenRepository;

use super::config::TokenServiceConfig;
use super::key_manager::SigningKeys;
use super::store::bounded;

/// Random bytes behind every refresh token string
const REFRESH_TOKEN_BYTES: usize = 32;

/// Generates an opaque refresh token string from the OS CSPRNG
pub(crate) fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hashes a token for storage; only this digest ever reaches the store
pub(crate) fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Mints token pairs for authenticated users
pub struct TokenIssuer<R: TokenRepository> {
    repository: Arc<R>,
    keys: Arc<SigningKeys>,
    config: Arc<TokenServiceConfig>,
}

impl<R: TokenRepository> Clone for TokenIssuer<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            keys: Arc::clone(&self.keys),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R: TokenRepository> TokenIssuer<R> {
    pub fn new(repository: Arc<R>, keys: Arc<SigningKeys>, config: Arc<TokenServiceConfig>) -> Self {
        Self {
            repository,
            keys,
            config,
        }
    }

    /// Generates a new token pair for a user
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Access token and refresh token; the refresh record is stored
    /// * `Err(DomainError::Persistence)` - The store rejected or timed out the insert
    /// * `Err(DomainError::Internal)` - Signing failed
    pub async fn issue(&self, user_id: UserId) -> DomainResult<TokenPair> {
        self.issue_at(user_id, Utc::now()).await
    }

    pub(crate) async fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> DomainResult<TokenPair> {
        let claims = Claims::new_access_token(
            user_id,
            &self.config.issuer,
            &self.config.audience,
            now,
            self.config.access_token_ttl,
        );
        let access_token = self.encode_claims(&claims)?;

        let refresh_token = generate_refresh_token();
        let record = RefreshToken::new(
            user_id,
            hash_token(&refresh_token),
            now,
            self.config.refresh_token_ttl,
        );

        bounded(
            self.config.store_timeout,
            "insert_refresh_token",
            self.repository.insert_refresh_token(record),
        )
        .await
        .map_err(|e| {
            error!(%user_id, error = %e, "Failed to store refresh token");
            match e {
                DomainError::Persistence { .. } => e,
                other => DomainError::persistence(other.to_string()),
            }
        })?;

        info!(%user_id, jti = %claims.jti, "Issued token pair");

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_ttl,
            self.config.refresh_token_ttl,
        ))
    }

    /// Encodes claims into a JWT with the current signing key
    pub(crate) fn encode_claims(&self, claims: &Claims) -> DomainResult<String> {
        let header = Header::new(self.keys.algorithm());
        encode(&header, claims, self.keys.encoding_key()).map_err(|e| DomainError::Internal {
            message: format!("Failed to sign access token: {}", e),
        })
    }
}
