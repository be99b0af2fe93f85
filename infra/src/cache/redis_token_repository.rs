//! Redis implementation of the TokenRepository trait.
//!
//! One key per refresh token hash holding the JSON record, written with a
//! native TTL so expired records disappear on their own. A per-user set
//! indexes the hashes for "logout everywhere". The record and its index
//! entry are written by one Lua script, so an insert lands whole or not at all.

use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Script};

use acct_core::domain::entities::token::RefreshToken;
use acct_core::domain::entities::user::UserId;
use acct_core::errors::DomainError;
use acct_core::repositories::TokenRepository;

use super::redis_client::RedisClient;
use crate::InfrastructureError;

/// KEYS[1] record, KEYS[2] user index; ARGV[1] payload, ARGV[2] ttl, ARGV[3] hash
const INSERT_SCRIPT: &str = r"
if not redis.call('SET', KEYS[1], ARGV[1], 'NX', 'EX', ARGV[2]) then
    return 0
end
redis.call('SADD', KEYS[2], ARGV[3])
if redis.call('TTL', KEYS[2]) < tonumber(ARGV[2]) then
    redis.call('EXPIRE', KEYS[2], ARGV[2])
end
return 1
";

/// Redis implementation of TokenRepository
#[derive(Clone)]
pub struct RedisTokenRepository {
    client: RedisClient,
    insert_script: Script,
}

impl RedisTokenRepository {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            insert_script: Script::new(INSERT_SCRIPT),
        }
    }

    fn token_key(&self, token_hash: &str) -> String {
        self.client.make_key(&format!("refresh:{}", token_hash))
    }

    /// Key of the set holding a user's refresh token hashes
    pub fn user_index_key(&self, user_id: UserId) -> String {
        self.client.make_key(&format!("user_refresh:{}", user_id))
    }
}

/// Remaining lifetime in whole seconds, at least one
fn ttl_seconds(token: &RefreshToken) -> u64 {
    let remaining = (token.expires_at - Utc::now()).num_milliseconds();
    ((remaining + 999) / 1000).max(1) as u64
}

fn store_error(action: &str, error: impl Into<InfrastructureError>) -> DomainError {
    let error = error.into();
    tracing::error!(error = %error, "Failed to {}", action);
    DomainError::from(error)
}

#[async_trait]
impl TokenRepository for RedisTokenRepository {
    async fn insert_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut conn = self.client.connection();
        let key = self.token_key(&token.token_hash);
        let payload = serde_json::to_string(&token).map_err(|e| store_error("encode refresh token", e))?;
        let ttl = ttl_seconds(&token);

        let stored: i64 = self
            .insert_script
            .key(&key)
            .key(self.user_index_key(token.user_id))
            .arg(payload)
            .arg(ttl)
            .arg(&token.token_hash)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| store_error("save refresh token", e))?;

        if stored == 0 {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }

        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let mut conn = self.client.connection();
        let payload: Option<String> = conn
            .get(self.token_key(token_hash))
            .await
            .map_err(|e| store_error("find refresh token", e))?;

        payload
            .map(|json| serde_json::from_str(&json).map_err(|e| store_error("decode refresh token", e)))
            .transpose()
    }

    async fn delete_refresh_token(&self, token_hash: &str) -> Result<bool, DomainError> {
        let mut conn = self.client.connection();
        // stale index entries are harmless and expire with the index key
        let removed: i64 = conn
            .del(self.token_key(token_hash))
            .await
            .map_err(|e| store_error("delete refresh token", e))?;

        Ok(removed == 1)
    }

    async fn delete_user_tokens(&self, user_id: UserId) -> Result<usize, DomainError> {
        let mut conn = self.client.connection();
        let index = self.user_index_key(user_id);

        let hashes: Vec<String> = conn
            .smembers(&index)
            .await
            .map_err(|e| store_error("list user tokens", e))?;

        let keys: Vec<String> = hashes.iter().map(|h| self.token_key(h)).collect();
        let removed: i64 = if keys.is_empty() {
            0
        } else {
            conn.del::<_, i64>(&keys)
                .await
                .map_err(|e| store_error("delete user tokens", e))?
        };

        conn.del::<_, i64>(&index)
            .await
            .map_err(|e| store_error("delete user token index", e))?;

        Ok(removed as usize)
    }

    async fn delete_expired_tokens(&self) -> Result<usize, DomainError> {
        // keys carry their own TTL
        Ok(0)
    }
}
