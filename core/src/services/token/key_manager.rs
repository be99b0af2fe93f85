//! Signing key ring for JWT signing and verification
//!
//! One current key signs new tokens. Previous keys are kept for
//! verification only so tokens issued before a rotation keep validating
//! until they expire.

use std::fs;
use std::path::Path;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use crate::errors::{DomainError, TokenError};

/// Key ring used by the issuer and the validator
#[derive(Clone)]
pub struct SigningKeys {
    algorithm: Algorithm,
    /// Current key for signing
    encoding_key: EncodingKey,
    /// Current key for verification, always tried first
    current: DecodingKey,
    /// Verify-only keys from earlier rotations, newest first
    previous: Vec<DecodingKey>,
    /// Where the keys came from, for diagnostics
    origin: String,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("algorithm", &self.algorithm)
            .field("previous_keys", &self.previous.len())
            .field("origin", &self.origin)
            .finish()
    }
}

fn key_load(message: String) -> DomainError {
    DomainError::Token(TokenError::KeyLoad { message })
}

impl SigningKeys {
    /// Creates an HS256 key ring from shared secrets
    ///
    /// # Arguments
    ///
    /// * `secret` - Current secret, used for signing and verification
    /// * `previous` - Retired secrets, accepted for verification only
    pub fn hmac<S: AsRef<str>>(secret: &str, previous: &[S]) -> Result<Self, DomainError> {
        if secret.is_empty() {
            return Err(key_load("HS256 secret must not be empty".to_string()));
        }

        let previous = previous
            .iter()
            .map(|s| {
                let s = s.as_ref();
                if s.is_empty() {
                    Err(key_load("previous HS256 secret must not be empty".to_string()))
                } else {
                    Ok(DecodingKey::from_secret(s.as_bytes()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            current: DecodingKey::from_secret(secret.as_bytes()),
            previous,
            origin: "secret".to_string(),
        })
    }

    /// Creates an RS256 key ring from PEM strings (useful for testing or embedded keys)
    ///
    /// # Returns
    ///
    /// * `Ok(SigningKeys)` - Keys parsed successfully
    /// * `Err(DomainError::Token(TokenError::KeyLoad))` - Invalid key format
    pub fn rsa_from_pem<S: AsRef<str>>(
        private_key_pem: &str,
        public_key_pem: &str,
        previous_public_key_pems: &[S],
    ) -> Result<Self, DomainError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| key_load(format!("Invalid private key format: {}", e)))?;

        let current = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| key_load(format!("Invalid public key format: {}", e)))?;

        let previous = previous_public_key_pems
            .iter()
            .enumerate()
            .map(|(i, pem)| {
                DecodingKey::from_rsa_pem(pem.as_ref().as_bytes())
                    .map_err(|e| key_load(format!("Invalid previous public key #{}: {}", i, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            algorithm: Algorithm::RS256,
            encoding_key,
            current,
            previous,
            origin: "memory".to_string(),
        })
    }

    /// Creates an RS256 key ring from PEM files
    ///
    /// # Example
    ///
    /// ```no_run
    /// use acct_core::services::token::SigningKeys;
    ///
    /// let keys = SigningKeys::rsa_from_files(
    ///     "keys/jwt_private_key.pem",
    ///     "keys/jwt_public_key.pem",
    ///     &["keys/jwt_public_key.old.pem"],
    /// )?;
    /// # Ok::<(), acct_core::errors::DomainError>(())
    /// ```
    pub fn rsa_from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        private_key_path: P,
        public_key_path: P,
        previous_public_key_paths: &[Q],
    ) -> Result<Self, DomainError> {
        let private_key_pem = read_pem(private_key_path.as_ref(), "private key")?;
        let public_key_pem = read_pem(public_key_path.as_ref(), "public key")?;
        let previous = previous_public_key_paths
            .iter()
            .map(|p| read_pem(p.as_ref(), "previous public key"))
            .collect::<Result<Vec<_>, _>>()?;

        let mut keys = Self::rsa_from_pem(&private_key_pem, &public_key_pem, &previous)?;
        keys.origin = public_key_path.as_ref().display().to_string();
        Ok(keys)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the encoding key for signing JWTs
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Verification keys in the order they should be tried
    pub fn decoding_keys(&self) -> impl Iterator<Item = &DecodingKey> {
        std::iter::once(&self.current).chain(self.previous.iter())
    }

    /// Number of verify-only keys
    pub fn previous_key_count(&self) -> usize {
        self.previous.len()
    }
}

fn read_pem(path: &Path, what: &str) -> Result<String, DomainError> {
    fs::read_to_string(path)
        .map_err(|e| key_load(format!("Failed to read {} {}: {}", what, path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_key_ring_order() {
        let keys = SigningKeys::hmac("current", &["old-1", "old-2"]).unwrap();
        assert_eq!(keys.algorithm(), Algorithm::HS256);
        assert_eq!(keys.previous_key_count(), 2);
        assert_eq!(keys.decoding_keys().count(), 3);
    }

    #[test]
    fn test_hmac_rejects_empty_secrets() {
        let none: [&str; 0] = [];
        assert!(matches!(
            SigningKeys::hmac("", &none),
            Err(DomainError::Token(TokenError::KeyLoad { .. }))
        ));
        assert!(SigningKeys::hmac("current", &[""]).is_err());
    }

    #[test]
    fn test_invalid_pem_is_key_load_error() {
        let none: [&str; 0] = [];
        let result = SigningKeys::rsa_from_pem("not a pem", "also not a pem", &none);
        assert!(matches!(
            result,
            Err(DomainError::Token(TokenError::KeyLoad { .. }))
        ));
    }

    #[test]
    fn test_missing_key_file() {
        let none: [&str; 0] = [];
        let result = SigningKeys::rsa_from_files("/nonexistent/private.pem", "/nonexistent/public.pem", &none);
        match result {
            Err(DomainError::Token(TokenError::KeyLoad { message })) => {
                assert!(message.contains("/nonexistent/private.pem"));
            }
            other => panic!("expected KeyLoad, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_debug_hides_key_material() {
        let keys = SigningKeys::hmac("very-secret-material", &["older-secret"]).unwrap();
        let rendered = format!("{:?}", keys);
        assert!(!rendered.contains("very-secret-material"));
        assert!(!rendered.contains("older-secret"));
        assert!(rendered.contains("HS256"));
    }
}
