//! Unit tests for the mock token repository contract

use chrono::{Duration, Utc};

use crate::domain::entities::token::RefreshToken;
use crate::domain::entities::user::UserId;
use crate::errors::DomainError;
use crate::repositories::token::{MockTokenRepository, TokenRepository};

fn record(user: i64, hash: &str, ttl: Duration) -> RefreshToken {
    RefreshToken::new(UserId::new(user), hash.to_string(), Utc::now(), ttl)
}

#[tokio::test]
async fn test_insert_and_find_refresh_token() {
    let repo = MockTokenRepository::new();
    let token = record(1, "test_hash", Duration::days(7));

    let saved = repo.insert_refresh_token(token.clone()).await.unwrap();
    assert_eq!(saved.id, token.id);

    let found = repo.find_refresh_token("test_hash").await.unwrap().unwrap();
    assert_eq!(found, token);
    assert!(repo.find_refresh_token("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_hash_is_rejected() {
    let repo = MockTokenRepository::new();

    repo.insert_refresh_token(record(1, "same_hash", Duration::days(7))).await.unwrap();
    let result = repo.insert_refresh_token(record(2, "same_hash", Duration::days(7))).await;

    assert!(matches!(result, Err(DomainError::Validation { .. })));
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn test_delete_reports_only_first_removal() {
    let repo = MockTokenRepository::new();
    repo.insert_refresh_token(record(1, "hash", Duration::days(7))).await.unwrap();

    assert!(repo.delete_refresh_token("hash").await.unwrap());
    assert!(!repo.delete_refresh_token("hash").await.unwrap());
    assert!(!repo.delete_refresh_token("never_existed").await.unwrap());
}

#[tokio::test]
async fn test_delete_user_tokens() {
    let repo = MockTokenRepository::new();
    for i in 0..3 {
        repo.insert_refresh_token(record(1, &format!("hash_{}", i), Duration::days(7)))
            .await
            .unwrap();
    }
    repo.insert_refresh_token(record(2, "other_hash", Duration::days(7))).await.unwrap();

    assert_eq!(repo.delete_user_tokens(UserId::new(1)).await.unwrap(), 3);
    assert_eq!(repo.len().await, 1);
    assert_eq!(repo.records_for(UserId::new(2)).await.len(), 1);
}

#[tokio::test]
async fn test_delete_expired_tokens() {
    let repo = MockTokenRepository::new();
    repo.seed(record(1, "live", Duration::days(1))).await;
    repo.seed(record(1, "dead", Duration::seconds(-5))).await;

    assert_eq!(repo.delete_expired_tokens().await.unwrap(), 1);
    assert!(repo.find_refresh_token("live").await.unwrap().is_some());
    assert!(repo.find_refresh_token("dead").await.unwrap().is_none());
}

#[tokio::test]
async fn test_failure_injection() {
    let repo = MockTokenRepository::new();

    repo.fail_inserts(true);
    assert!(matches!(
        repo.insert_refresh_token(record(1, "h", Duration::days(1))).await,
        Err(DomainError::Persistence { .. })
    ));
    assert_eq!(repo.len().await, 0);

    repo.fail_finds(true);
    assert!(repo.find_refresh_token("h").await.is_err());

    repo.fail_deletes(true);
    assert!(repo.delete_refresh_token("h").await.is_err());
}
