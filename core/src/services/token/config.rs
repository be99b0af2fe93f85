//! Configuration for the token service

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use acct_shared::config::JwtConfig;
use chrono::Duration;
use jsonwebtoken::Algorithm;
use tracing::warn;

use crate::domain::entities::token::{JWT_AUDIENCE, JWT_ISSUER};
use crate::errors::{DomainError, DomainResult};

use super::key_manager::SigningKeys;

/// Longest lifetime accepted for either token, in days
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

fn ttl_from_seconds(name: &str, seconds: i64) -> DomainResult<Duration> {
    Duration::try_seconds(seconds).ok_or_else(|| DomainError::Validation {
        message: format!("{} of {} seconds is out of range", name, seconds),
    })
}

/// Where the signing key ring comes from
#[derive(Clone)]
pub enum KeySource {
    /// HS256 shared secrets; `previous` are verify-only
    Hmac { secret: String, previous: Vec<String> },
    /// RS256 PEM files; previous public keys are verify-only
    RsaFiles {
        private_key_path: String,
        public_key_path: String,
        previous_public_key_paths: Vec<String>,
    },
    /// RS256 PEM strings, mostly for tests and embedded deployments
    RsaPem {
        private_key_pem: String,
        public_key_pem: String,
        previous_public_key_pems: Vec<String>,
    },
}

impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Hmac { previous, .. } => f
                .debug_struct("Hmac")
                .field("previous", &previous.len())
                .finish_non_exhaustive(),
            KeySource::RsaFiles {
                private_key_path,
                public_key_path,
                previous_public_key_paths,
            } => f
                .debug_struct("RsaFiles")
                .field("private_key_path", private_key_path)
                .field("public_key_path", public_key_path)
                .field("previous_public_key_paths", previous_public_key_paths)
                .finish(),
            KeySource::RsaPem {
                previous_public_key_pems,
                ..
            } => f
                .debug_struct("RsaPem")
                .field("previous", &previous_public_key_pems.len())
                .finish_non_exhaustive(),
        }
    }
}

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Signing key ring source
    pub keys: KeySource,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime; must exceed the access token lifetime
    pub refresh_token_ttl: Duration,
    /// `iss` claim written and required
    pub issuer: String,
    /// `aud` claim written and required
    pub audience: String,
    /// Upper bound for a single store call
    pub store_timeout: StdDuration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            keys: KeySource::Hmac {
                secret: "development-secret-please-change-in-production".to_string(),
                previous: Vec::new(),
            },
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
            issuer: JWT_ISSUER.to_string(),
            audience: JWT_AUDIENCE.to_string(),
            store_timeout: StdDuration::from_secs(5),
        }
    }
}

impl TokenServiceConfig {
    /// HS256 configuration with the given secret and default lifetimes
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            keys: KeySource::Hmac {
                secret: secret.into(),
                previous: Vec::new(),
            },
            ..Default::default()
        }
    }

    /// JWT algorithm implied by the key source
    pub fn algorithm(&self) -> Algorithm {
        match self.keys {
            KeySource::Hmac { .. } => Algorithm::HS256,
            KeySource::RsaFiles { .. } | KeySource::RsaPem { .. } => Algorithm::RS256,
        }
    }

    /// Checks lifetimes and key material before anything is loaded
    pub fn validate(&self) -> DomainResult<()> {
        if self.access_token_ttl <= Duration::zero() {
            return Err(DomainError::Validation {
                message: "access token ttl must be positive".to_string(),
            });
        }
        if self.refresh_token_ttl > Duration::days(MAX_TOKEN_TTL_DAYS) {
            return Err(DomainError::Validation {
                message: format!("refresh token ttl must not exceed {} days", MAX_TOKEN_TTL_DAYS),
            });
        }
        if self.refresh_token_ttl <= self.access_token_ttl {
            return Err(DomainError::Validation {
                message: "refresh token ttl must be longer than access token ttl".to_string(),
            });
        }
        if self.store_timeout.is_zero() {
            return Err(DomainError::Validation {
                message: "store timeout must be positive".to_string(),
            });
        }
        if let KeySource::Hmac { secret, previous } = &self.keys {
            if secret.is_empty() || previous.iter().any(String::is_empty) {
                return Err(DomainError::Validation {
                    message: "HS256 secrets must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Loads the key ring described by `keys`
    pub fn load_keys(&self) -> DomainResult<SigningKeys> {
        match &self.keys {
            KeySource::Hmac { secret, previous } => SigningKeys::hmac(secret, previous),
            KeySource::RsaFiles {
                private_key_path,
                public_key_path,
                previous_public_key_paths,
            } => SigningKeys::rsa_from_files(private_key_path, public_key_path, previous_public_key_paths),
            KeySource::RsaPem {
                private_key_pem,
                public_key_pem,
                previous_public_key_pems,
            } => SigningKeys::rsa_from_pem(private_key_pem, public_key_pem, previous_public_key_pems),
        }
    }
}

impl TryFrom<&JwtConfig> for TokenServiceConfig {
    type Error = DomainError;

    fn try_from(jwt: &JwtConfig) -> Result<Self, Self::Error> {
        let algorithm = Algorithm::from_str(&jwt.algorithm).map_err(|_| DomainError::Validation {
            message: format!("unsupported JWT algorithm: {}", jwt.algorithm),
        })?;

        let keys = match algorithm {
            Algorithm::HS256 => {
                if jwt.is_using_default_secret() {
                    warn!("JWT_SECRET is not set, signing with the development default");
                }
                KeySource::Hmac {
                    secret: jwt.secret.clone(),
                    previous: jwt.previous_secrets.clone(),
                }
            }
            Algorithm::RS256 => {
                let (Some(private_key_path), Some(public_key_path)) =
                    (jwt.private_key_path.clone(), jwt.public_key_path.clone())
                else {
                    return Err(DomainError::Validation {
                        message: "RS256 requires JWT_PRIVATE_KEY_PATH and JWT_PUBLIC_KEY_PATH".to_string(),
                    });
                };
                KeySource::RsaFiles {
                    private_key_path,
                    public_key_path,
                    previous_public_key_paths: jwt.previous_public_key_paths.clone(),
                }
            }
            other => {
                return Err(DomainError::Validation {
                    message: format!("unsupported JWT algorithm: {:?}", other),
                })
            }
        };

        let config = Self {
            keys,
            access_token_ttl: ttl_from_seconds("access token ttl", jwt.access_token_expiry)?,
            refresh_token_ttl: ttl_from_seconds("refresh token ttl", jwt.refresh_token_expiry)?,
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            store_timeout: StdDuration::from_millis(jwt.store_timeout_ms),
        };
        config.validate()?;
        Ok(config)
    }
}
