//! Mock implementation of TokenRepository for testing

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::entities::token::RefreshToken;
use crate::domain::entities::user::UserId;
use crate::errors::DomainError;

use super::trait_::TokenRepository;

/// Mock token repository for testing
///
/// Holds records in memory and can be told to fail or stall individual
/// operations so error paths are reachable from unit tests.
#[derive(Default)]
pub struct MockTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
    fail_insert: AtomicBool,
    fail_find: AtomicBool,
    fail_delete: AtomicBool,
    delay_ms: AtomicU64,
}

impl MockTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn fail_finds(&self, fail: bool) {
        self.fail_find.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Every call sleeps this long before touching the map
    pub fn delay_calls(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Seed a record directly, bypassing the issuer
    pub async fn seed(&self, token: RefreshToken) {
        self.tokens.write().await.insert(token.token_hash.clone(), token);
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn records_for(&self, user_id: UserId) -> Vec<RefreshToken> {
        self.tokens
            .read()
            .await
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    async fn stall(&self) {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

#[async_trait]
impl TokenRepository for MockTokenRepository {
    async fn insert_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        self.stall().await;
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(DomainError::persistence("insert failed"));
        }

        let mut tokens = self.tokens.write().await;

        // Check for duplicate
        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }

        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        self.stall().await;
        if self.fail_find.load(Ordering::SeqCst) {
            return Err(DomainError::persistence("find failed"));
        }

        let tokens = self.tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn delete_refresh_token(&self, token_hash: &str) -> Result<bool, DomainError> {
        self.stall().await;
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(DomainError::persistence("delete failed"));
        }

        let mut tokens = self.tokens.write().await;
        Ok(tokens.remove(token_hash).is_some())
    }

    async fn delete_user_tokens(&self, user_id: UserId) -> Result<usize, DomainError> {
        self.stall().await;
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| token.user_id != user_id);
        Ok(before - tokens.len())
    }

    async fn delete_expired_tokens(&self) -> Result<usize, DomainError> {
        self.stall().await;
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        let now = Utc::now();
        tokens.retain(|_, token| !token.is_expired_at(now));
        Ok(before - tokens.len())
    }
}
