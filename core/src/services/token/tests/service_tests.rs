//! Token service construction and facade behaviour

use std::sync::Arc;

use chrono::{Duration, Utc};

use acct_shared::config::JwtConfig;
use acct_shared::errors::{error_codes, IntoErrorResponse};

use crate::domain::entities::token::RefreshToken;
use crate::domain::entities::user::UserId;
use crate::errors::{DomainError, TokenError, AUTHENTICATION_FAILED};
use crate::repositories::MockTokenRepository;
use crate::services::token::{SigningKeys, TokenService, TokenServiceConfig, MAX_TOKEN_TTL_DAYS};

use super::{test_config, test_service};

#[test]
fn test_new_rejects_invalid_config() {
    let repository = Arc::new(MockTokenRepository::new());
    let config = TokenServiceConfig {
        access_token_ttl: Duration::days(8),
        refresh_token_ttl: Duration::days(7),
        ..test_config()
    };

    let result = TokenService::new(repository, config);
    assert!(matches!(result, Err(DomainError::Validation { .. })));
}

#[tokio::test]
async fn test_longest_accepted_ttl_issues_and_refreshes() {
    let repository = Arc::new(MockTokenRepository::new());
    let config = TokenServiceConfig {
        refresh_token_ttl: Duration::days(MAX_TOKEN_TTL_DAYS),
        ..test_config()
    };
    let service = TokenService::new(repository.clone(), config).unwrap();

    let pair = service.issue(UserId::new(5)).await.unwrap();
    assert_eq!(pair.refresh_expires_in, MAX_TOKEN_TTL_DAYS * 86400);
    assert!(service.refresh(&pair.refresh_token).await.is_ok());

    let too_long = TokenServiceConfig {
        refresh_token_ttl: Duration::days(365 * 1_000_000),
        ..test_config()
    };
    assert!(matches!(
        TokenService::new(repository, too_long),
        Err(DomainError::Validation { .. })
    ));
}

#[test]
fn test_new_rejects_empty_secret() {
    let repository = Arc::new(MockTokenRepository::new());
    let result = TokenService::new(repository, TokenServiceConfig::with_secret(""));
    assert!(result.is_err());
}

#[tokio::test]
async fn test_service_from_environment_style_config() {
    let jwt = JwtConfig::new("env-secret").with_access_expiry_minutes(10);
    let config = TokenServiceConfig::try_from(&jwt).unwrap();
    let service = TokenService::new(Arc::new(MockTokenRepository::new()), config).unwrap();

    let pair = service.issue(UserId::new(12)).await.unwrap();
    assert_eq!(pair.access_expires_in, 600);
    assert_eq!(service.validate(&pair.access_token), Ok(UserId::new(12)));
}

#[tokio::test]
async fn test_with_keys_shares_one_ring() {
    let keys = Arc::new(SigningKeys::hmac("shared-ring", &["older"]).unwrap());
    let first = TokenService::with_keys(
        Arc::new(MockTokenRepository::new()),
        test_config(),
        Arc::clone(&keys),
    );
    let second = TokenService::with_keys(Arc::new(MockTokenRepository::new()), test_config(), keys);

    let pair = first.issue(UserId::new(4)).await.unwrap();
    assert_eq!(second.validate(&pair.access_token), Ok(UserId::new(4)));
    // the refresh record lives only in the first store
    assert!(second.refresh(&pair.refresh_token).await.is_err());
}

#[tokio::test]
async fn test_clones_share_store() {
    let (repository, service) = test_service();
    let clone = service.clone();

    let pair = service.issue(UserId::new(6)).await.unwrap();
    assert!(clone.refresh(&pair.refresh_token).await.is_ok());
    assert!(service.refresh(&pair.refresh_token).await.is_err());
    assert_eq!(repository.len().await, 1);
}

#[tokio::test]
async fn test_cleanup_expired_tokens() {
    let (repository, service) = test_service();
    service.issue(UserId::new(1)).await.unwrap();
    repository
        .seed(RefreshToken::new(
            UserId::new(2),
            "expired".to_string(),
            Utc::now() - Duration::days(10),
            Duration::days(7),
        ))
        .await;

    assert_eq!(service.cleanup_expired_tokens().await.unwrap(), 1);
    assert_eq!(repository.len().await, 1);
}

#[tokio::test]
async fn test_rejections_map_to_generic_unauthenticated_response() {
    let (_, service) = test_service();
    let pair = service.issue(UserId::new(1)).await.unwrap();
    service.refresh(&pair.refresh_token).await.unwrap();

    let replay = service.refresh(&pair.refresh_token).await.unwrap_err();
    let forged = DomainError::from(service.validate("a.b.c").unwrap_err());
    let expired = DomainError::from(TokenError::Expired);

    for error in [replay, forged, expired] {
        assert!(error.is_unauthenticated());
        let response = error.to_error_response();
        assert_eq!(response.status, 401);
        assert_eq!(response.error, error_codes::UNAUTHORIZED);
        assert_eq!(response.message, AUTHENTICATION_FAILED);
    }
}

#[tokio::test]
async fn test_store_fault_is_not_unauthenticated() {
    let (repository, service) = test_service();
    let pair = service.issue(UserId::new(1)).await.unwrap();
    repository.fail_finds(true);

    let error = service.refresh(&pair.refresh_token).await.unwrap_err();
    assert!(!error.is_unauthenticated());
    assert_eq!(error.to_error_response().status, 503);
}
