//! MySQL implementation of the TokenRepository trait.
//!
//! Refresh token records live in the `refresh_tokens` table, keyed by a
//! unique `token_hash`. Consumption is a single `DELETE` whose affected-row
//! count tells the caller whether it won the row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use acct_core::domain::entities::token::RefreshToken;
use acct_core::domain::entities::user::UserId;
use acct_core::errors::DomainError;
use acct_core::repositories::TokenRepository;

/// MySQL implementation of TokenRepository
#[derive(Clone)]
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<RefreshToken, DomainError> {
        let id: String = row.try_get("id").map_err(|e| column_error("id", e))?;

        Ok(RefreshToken {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid token UUID: {}", e),
            })?,
            user_id: UserId::new(row.try_get("user_id").map_err(|e| column_error("user_id", e))?),
            token_hash: row
                .try_get("token_hash")
                .map_err(|e| column_error("token_hash", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| column_error("expires_at", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| column_error("created_at", e))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| column_error("updated_at", e))?,
        })
    }
}

fn column_error(column: &str, error: sqlx::Error) -> DomainError {
    DomainError::Internal {
        message: format!("Failed to get {}: {}", column, error),
    }
}

fn store_error(action: &str, error: sqlx::Error) -> DomainError {
    tracing::error!(error = %error, "Failed to {}", action);
    DomainError::Persistence {
        message: format!("Failed to {}: {}", action, error),
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn insert_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, token_hash, expires_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(token.id.to_string())
            .bind(token.user_id.get())
            .bind(&token.token_hash)
            .bind(token.expires_at)
            .bind(token.created_at)
            .bind(token.updated_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(token),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            }),
            Err(e) => Err(store_error("save refresh token", e)),
        }
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = r#"
            SELECT id, user_id, token_hash, expires_at, created_at, updated_at
            FROM refresh_tokens
            WHERE token_hash = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("find refresh token", e))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_refresh_token(&self, token_hash: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("delete refresh token", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_user_tokens(&self, user_id: UserId) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
            .bind(user_id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("delete user tokens", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired_tokens(&self) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("delete expired tokens", e))?;

        Ok(result.rows_affected() as usize)
    }
}
