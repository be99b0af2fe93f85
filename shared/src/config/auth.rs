//! Session credential configuration

use serde::{Deserialize, Serialize};

const DEFAULT_SECRET: &str = "development-secret-please-change-in-production";

/// JWT signing and token lifetime configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Current HS256 secret used to sign access tokens
    pub secret: String,

    /// Retired HS256 secrets still accepted for verification
    #[serde(default)]
    pub previous_secrets: Vec<String>,

    /// Algorithm for JWT signing ("HS256" or "RS256")
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// PEM private key path (RS256 only)
    #[serde(default)]
    pub private_key_path: Option<String>,

    /// PEM public key path (RS256 only)
    #[serde(default)]
    pub public_key_path: Option<String>,

    /// Retired PEM public keys still accepted for verification (RS256 only)
    #[serde(default)]
    pub previous_public_key_paths: Vec<String>,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// JWT audience claim
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Upper bound for a single refresh-token store call, in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            previous_secrets: Vec::new(),
            algorithm: default_algorithm(),
            private_key_path: None,
            public_key_path: None,
            previous_public_key_paths: Vec::new(),
            access_token_expiry: 900,      // 15 minutes
            refresh_token_expiry: 604800,  // 7 days
            issuer: default_issuer(),
            audience: default_audience(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            previous_secrets: std::env::var("JWT_PREVIOUS_SECRETS")
                .map(|value| split_list(&value))
                .unwrap_or_default(),
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or(defaults.algorithm),
            private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH").ok(),
            public_key_path: std::env::var("JWT_PUBLIC_KEY_PATH").ok(),
            previous_public_key_paths: std::env::var("JWT_PREVIOUS_PUBLIC_KEY_PATHS")
                .map(|value| split_list(&value))
                .unwrap_or_default(),
            access_token_expiry: std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.access_token_expiry),
            refresh_token_expiry: std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_token_expiry),
            issuer: defaults.issuer,
            audience: defaults.audience,
            store_timeout_ms: std::env::var("JWT_STORE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.store_timeout_ms),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes.saturating_mul(60);
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days.saturating_mul(86400);
        self
    }

    /// Keep accepting tokens signed with a retired secret
    pub fn with_previous_secret(mut self, secret: impl Into<String>) -> Self {
        self.previous_secrets.push(secret.into());
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_issuer() -> String {
    String::from("account-server")
}

fn default_audience() -> String {
    String::from("account-api")
}

fn default_store_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 604800);
        assert_eq!(config.algorithm, "HS256");
        assert_eq!(config.store_timeout_ms, 5000);
        assert!(config.previous_secrets.is_empty());
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("my-secret")
            .with_access_expiry_minutes(30)
            .with_refresh_expiry_days(14)
            .with_previous_secret("old-secret");

        assert_eq!(config.access_token_expiry, 1800);
        assert_eq!(config.refresh_token_expiry, 1209600);
        assert_eq!(config.previous_secrets, vec!["old-secret".to_string()]);
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "secret": "s3cret",
            "access_token_expiry": 60,
            "refresh_token_expiry": 3600
        }"#;
        let config: JwtConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.algorithm, "HS256");
        assert_eq!(config.issuer, "account-server");
        assert_eq!(config.audience, "account-api");
        assert!(config.private_key_path.is_none());
    }
}
