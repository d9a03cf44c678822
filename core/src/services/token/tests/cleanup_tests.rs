//! Unit tests for the token cleanup service

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::domain::entities::token::RefreshToken;
use crate::repositories::{InMemoryTokenRepository, RefreshTokenRepository};
use crate::services::token::{TokenCleanupConfig, TokenCleanupService};

fn token_created_days_ago(days: i64) -> RefreshToken {
    let mut token = RefreshToken::generate("user-1", "jti").unwrap();
    token.created_at = Utc::now() - Duration::days(days);
    token
}

async fn seeded_repository() -> Arc<InMemoryTokenRepository> {
    let repo = Arc::new(InMemoryTokenRepository::new());
    for days in [0, 3, 10, 40] {
        repo.insert(token_created_days_ago(days)).await.unwrap();
    }
    repo
}

#[tokio::test]
async fn test_run_cleanup_deletes_records_past_retention() {
    let repo = seeded_repository().await;
    let config = TokenCleanupConfig {
        retention_days: 7,
        ..Default::default()
    };
    let service = TokenCleanupService::new(repo.clone(), config, Duration::days(7));

    let result = service.run_cleanup().await.unwrap();

    assert!(result.is_success());
    assert_eq!(result.tokens_deleted, 2);
    assert_eq!(repo.len().await, 2);
}

#[tokio::test]
async fn test_retention_is_never_shorter_than_refresh_lifetime() {
    let repo = seeded_repository().await;
    let config = TokenCleanupConfig {
        retention_days: 1,
        ..Default::default()
    };
    let service = TokenCleanupService::new(repo.clone(), config, Duration::days(14));

    assert_eq!(service.retention(), Duration::days(14));

    let result = service.run_cleanup().await.unwrap();
    assert_eq!(result.tokens_deleted, 1);
    assert_eq!(repo.len().await, 3);
}

#[tokio::test]
async fn test_disabled_cleanup_does_nothing() {
    let repo = seeded_repository().await;
    let config = TokenCleanupConfig {
        enabled: false,
        ..Default::default()
    };
    let service = Arc::new(TokenCleanupService::new(repo.clone(), config, Duration::days(7)));

    let result = service.run_cleanup().await.unwrap();
    assert_eq!(result.tokens_deleted, 0);
    assert!(service.start_background_task().is_none());
    assert_eq!(repo.len().await, 4);
}

#[tokio::test]
async fn test_background_task_runs_immediately() {
    let repo = seeded_repository().await;
    let config = TokenCleanupConfig {
        interval_seconds: 3600,
        retention_days: 7,
        enabled: true,
    };
    let service = Arc::new(TokenCleanupService::new(repo.clone(), config, Duration::days(7)));

    let handle = service.start_background_task().unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    handle.abort();

    assert_eq!(repo.len().await, 2);
}

#[tokio::test]
async fn test_huge_retention_deletes_nothing() {
    let repo = seeded_repository().await;
    let config = TokenCleanupConfig {
        retention_days: i64::MAX,
        ..Default::default()
    };
    let service = TokenCleanupService::new(repo.clone(), config, Duration::days(7));

    let result = service.run_cleanup().await.unwrap();

    assert!(result.is_success());
    assert_eq!(result.tokens_deleted, 0);
    assert_eq!(repo.len().await, 4);
}
