//! Access token validation
//!
//! Pure computation over the token bytes, the key ring and the clock. The
//! validator owns no repository handle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::crypto::verify;
use jsonwebtoken::{decode, Validation};
use tracing::debug;

use crate::domain::entities::token::Claims;
use crate::domain::entities::user::UserId;
use crate::errors::TokenError;

use super::config::TokenServiceConfig;
use super::key_manager::SigningKeys;

const BEARER_SCHEME: &str = "bearer";

/// Extracts the credential from an `Authorization` header value
///
/// The scheme is matched case-insensitively. Returns `None` for any other
/// scheme or an empty credential.
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    let header_value = header_value.trim();
    let (scheme, credential) = header_value.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let credential = credential.trim();
    (!credential.is_empty()).then_some(credential)
}

/// Validates access tokens against the key ring
#[derive(Clone)]
pub struct TokenValidator {
    keys: Arc<SigningKeys>,
    validation: Validation,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl TokenValidator {
    pub fn new(keys: Arc<SigningKeys>, config: &TokenServiceConfig) -> Self {
        let mut validation = Validation::new(keys.algorithm());
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        // exp is checked in validate_at against the caller's clock
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self { keys, validation }
    }

    /// Validates an access token and returns the user it authenticates
    pub fn validate(&self, token: &str) -> Result<UserId, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validates an access token as of `now`
    ///
    /// # Returns
    ///
    /// * `Ok(UserId)` - Signature verified, not expired, `sub` numeric
    /// * `Err(TokenError::InvalidSignature)` - No key in the ring verifies the token
    /// * `Err(TokenError::Expired)` - `now` is past `exp`
    /// * `Err(TokenError::Malformed)` - No signature segment, or verified claims are unusable
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let claims = self.verified_claims(token)?;

        if claims.is_expired_at(now) {
            debug!(exp = claims.exp, "Rejected expired access token");
            return Err(TokenError::Expired);
        }

        claims.user_id().map_err(|_| {
            debug!("Rejected access token with non-numeric subject");
            TokenError::Malformed
        })
    }

    /// Validates the credential carried in an `Authorization` header value
    pub fn authenticate_bearer(&self, header_value: &str) -> Result<UserId, TokenError> {
        let token = extract_bearer_token(header_value).ok_or_else(|| {
            debug!("Missing or malformed bearer credential");
            TokenError::Malformed
        })?;
        self.validate(token)
    }

    /// Checks the signature against each key in turn and decodes the claims
    ///
    /// The signature is checked over the raw `header.payload` text before
    /// anything is parsed, so a change to any byte of a signed token fails
    /// here. Expiry is not checked.
    pub fn verified_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let Some((message, signature)) = token.rsplit_once('.') else {
            debug!("Rejected access token without a signature segment");
            return Err(TokenError::Malformed);
        };

        let algorithm = self.keys.algorithm();
        let key = self
            .keys
            .decoding_keys()
            .find(|key| matches!(verify(signature, message.as_bytes(), key, algorithm), Ok(true)))
            .ok_or_else(|| {
                debug!("Rejected access token: no key in the ring verifies it");
                TokenError::InvalidSignature
            })?;

        // the signed text is ours, so anything still wrong is in the claims
        decode::<Claims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Rejected access token with unusable claims");
                TokenError::Malformed
            })
    }
}
