//! In-process refresh token store
//!
//! Suitable for tests and single-node development. Records are lost on
//! restart, which only forces users to log in again.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use acct_core::domain::entities::token::RefreshToken;
use acct_core::domain::entities::user::UserId;
use acct_core::errors::DomainError;
use acct_core::repositories::TokenRepository;

/// HashMap-backed TokenRepository keyed by token hash
#[derive(Clone, Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, expired ones included
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn insert_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }
        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        Ok(self.tokens.read().await.get(token_hash).cloned())
    }

    async fn delete_refresh_token(&self, token_hash: &str) -> Result<bool, DomainError> {
        Ok(self.tokens.write().await.remove(token_hash).is_some())
    }

    async fn delete_user_tokens(&self, user_id: UserId) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| token.user_id != user_id);
        Ok(before - tokens.len())
    }

    async fn delete_expired_tokens(&self) -> Result<usize, DomainError> {
        let now = Utc::now();
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| !token.is_expired_at(now));
        Ok(before - tokens.len())
    }
}
