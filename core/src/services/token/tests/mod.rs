//! Token service tests
//!
//! Shared fixtures live here; the scenarios are split by component.

mod service_tests;

use std::ops::Range;
use std::sync::Arc;

use crate::repositories::MockTokenRepository;
use crate::services::token::{TokenService, TokenServiceConfig};

pub(super) const SECRET: &str = "test-secret-key-for-unit-tests";

pub(super) fn test_config() -> TokenServiceConfig {
    TokenServiceConfig::with_secret(SECRET)
}

pub(super) fn service_with(
    repository: Arc<MockTokenRepository>,
    config: TokenServiceConfig,
) -> TokenService<MockTokenRepository> {
    TokenService::new(repository, config).expect("test config is valid")
}

pub(super) fn test_service() -> (Arc<MockTokenRepository>, TokenService<MockTokenRepository>) {
    let repository = Arc::new(MockTokenRepository::new());
    let service = service_with(repository.clone(), test_config());
    (repository, service)
}

/// Byte range of the `n`th dot-separated segment
pub(super) fn segment(token: &str, n: usize) -> Range<usize> {
    let mut start = 0;
    for (i, part) in token.split('.').enumerate() {
        if i == n {
            return start..start + part.len();
        }
        start += part.len() + 1;
    }
    panic!("token has no segment {}", n);
}

/// Replaces one base64url character with a different one
pub(super) fn tamper(token: &str, index: usize) -> String {
    let mut bytes = token.as_bytes().to_vec();
    bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
    String::from_utf8(bytes).unwrap()
}
