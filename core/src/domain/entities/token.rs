//! Token entities for JWT-based session credentials.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Default JWT issuer
pub const JWT_ISSUER: &str = "account-server";

/// Default JWT audience
pub const JWT_AUDIENCE: &str = "account-api";

/// Claims structure for the access token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID rendered as a decimal string)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    /// Creates new claims for an access token
    ///
    /// # Arguments
    ///
    /// * `user_id` - The account the token authenticates
    /// * `issuer` / `audience` - Values checked again on validation
    /// * `issued_at` - Issue instant; `exp` is `issued_at + ttl`, saturating
    /// * `ttl` - Access token lifetime
    pub fn new_access_token(
        user_id: UserId,
        issuer: &str,
        audience: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let expiry = expiry_after(issued_at, ttl);

        Self {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expiry.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// A token is expired once `now` is strictly past `exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<UserId, std::num::ParseIntError> {
        self.sub.parse()
    }
}

/// `issued_at + ttl`, clamped to the representable range
fn expiry_after(issued_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    issued_at.checked_add_signed(ttl).unwrap_or(if ttl < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// Refresh token record owned by the store
///
/// Only the SHA-256 digest of the client's opaque token string is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier for the record
    pub id: Uuid,

    /// User ID this token belongs to
    pub user_id: UserId,

    /// Hex SHA-256 of the opaque token string; unique per store
    pub token_hash: String,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the record was last written
    pub updated_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Creates a new refresh token record
    pub fn new(user_id: UserId, token_hash: String, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            expires_at: expiry_after(issued_at, ttl),
            created_at: issued_at,
            updated_at: issued_at,
        }
    }

    /// A record is dead once `expires_at <= now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Token pair returned to the client on login and refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// Opaque refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub access_expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in: access_ttl.num_seconds(),
            refresh_expires_in: refresh_ttl.num_seconds(),
        }
    }
}
