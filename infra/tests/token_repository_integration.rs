//! Integration tests for the MySQL refresh token repository
//!
//! These tests need a MySQL database reachable through `DATABASE_URL`.
//! Run with `cargo test -p authp_infra -- --ignored`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use authp_core::{
    ClaimSet, ClaimsError, ClaimsSource, DomainError, RefreshFailure, RefreshToken,
    RefreshTokenRepository,
};
use authp_infra::build_token_service;
use authp_infra::database::{DatabasePool, MySqlTokenRepository};
use authp_shared::config::{DatabaseConfig, JwtConfig};

async fn setup() -> anyhow::Result<(DatabasePool, MySqlTokenRepository)> {
    let pool = DatabasePool::new(DatabaseConfig::from_env().with_max_connections(5)).await?;
    pool.run_migrations().await?;
    let repository = MySqlTokenRepository::new(pool.get_pool().clone());
    Ok((pool, repository))
}

/// Unique user per test run so tests do not see each other's rows
fn test_user() -> String {
    format!("it-user-{}", RefreshToken::new_value())
}

struct RoleClaims;

#[async_trait]
impl ClaimsSource for RoleClaims {
    async fn get_claims(&self, user_id: &str) -> Result<ClaimSet, ClaimsError> {
        if user_id.is_empty() {
            return Err(ClaimsError::UserNotFound {
                user_id: user_id.to_string(),
            });
        }
        Ok(ClaimSet::new().with("role", "member"))
    }
}

#[tokio::test]
#[ignore] // Requires MySQL via DATABASE_URL
async fn test_insert_and_find() -> anyhow::Result<()> {
    let (_pool, repo) = setup().await?;
    let token = RefreshToken::generate(test_user(), "jti-1")?;

    repo.insert(token.clone()).await?;

    let found = repo.find_by_value(&token.value).await?.expect("token stored");
    assert_eq!(found.value, token.value);
    assert_eq!(found.user_id, token.user_id);
    assert_eq!(found.access_token_id, "jti-1");
    assert!(!found.is_invalid);
    assert!((found.created_at - token.created_at).num_milliseconds().abs() < 1000);

    // Values are case sensitive
    let upper = token.value.to_uppercase();
    if upper != token.value {
        assert!(repo.find_by_value(&upper).await?.is_none());
    }
    Ok(())
}

#[tokio::test]
#[ignore] // Requires MySQL via DATABASE_URL
async fn test_duplicate_value_maps_to_duplicate_key() -> anyhow::Result<()> {
    let (_pool, repo) = setup().await?;
    let token = RefreshToken::generate(test_user(), "jti-1")?;
    repo.insert(token.clone()).await?;

    let result = repo.insert(token).await;
    assert!(matches!(result, Err(DomainError::DuplicateKey { .. })));
    Ok(())
}

#[tokio::test]
#[ignore] // Requires MySQL via DATABASE_URL
async fn test_rotate() -> anyhow::Result<()> {
    let (_pool, repo) = setup().await?;
    let user = test_user();
    let old = RefreshToken::generate(user.clone(), "jti-1")?;
    repo.insert(old.clone()).await?;

    let replacement = RefreshToken::generate(user.clone(), "jti-2")?;
    assert!(repo.rotate(&old.value, replacement.clone()).await?);

    assert!(repo.find_by_value(&old.value).await?.expect("old kept").is_invalid);
    assert!(!repo.find_by_value(&replacement.value).await?.expect("new stored").is_invalid);

    // Second rotation of the same value loses
    let again = RefreshToken::generate(user.clone(), "jti-3")?;
    assert!(!repo.rotate(&old.value, again.clone()).await?);
    assert!(repo.find_by_value(&again.value).await?.is_none());

    let missing = repo.rotate("missing-value", RefreshToken::generate(user, "jti-4")?).await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
    Ok(())
}

#[tokio::test]
#[ignore] // Requires MySQL via DATABASE_URL
async fn test_rotate_rolls_back_on_duplicate_replacement() -> anyhow::Result<()> {
    let (_pool, repo) = setup().await?;
    let user = test_user();
    let old = RefreshToken::generate(user.clone(), "jti-1")?;
    let existing = RefreshToken::generate(user.clone(), "jti-2")?;
    repo.insert(old.clone()).await?;
    repo.insert(existing.clone()).await?;

    let mut replacement = RefreshToken::generate(user, "jti-3")?;
    replacement.value = existing.value.clone();

    let result = repo.rotate(&old.value, replacement).await;
    assert!(matches!(result, Err(DomainError::DuplicateKey { .. })));
    assert!(!repo.find_by_value(&old.value).await?.expect("old kept").is_invalid);
    Ok(())
}

#[tokio::test]
#[ignore] // Requires MySQL via DATABASE_URL
async fn test_user_tokens_and_cleanup() -> anyhow::Result<()> {
    let (_pool, repo) = setup().await?;
    let user = test_user();

    let mut stale = RefreshToken::generate(user.clone(), "jti-old")?;
    stale.created_at = Utc::now() - Duration::days(365 * 20);
    repo.insert(stale.clone()).await?;
    for i in 0..2 {
        repo.insert(RefreshToken::generate(user.clone(), format!("jti-{}", i))?).await?;
    }

    assert_eq!(repo.count_user_tokens(&user).await?, 3);
    assert_eq!(repo.find_by_user_id(&user).await?.len(), 3);

    let deleted = repo.delete_created_before(Utc::now() - Duration::days(365 * 19)).await?;
    assert!(deleted >= 1);
    assert!(repo.find_by_value(&stale.value).await?.is_none());

    assert_eq!(repo.revoke_all_user_tokens(&user).await?, 2);
    assert_eq!(repo.count_user_tokens(&user).await?, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Requires MySQL via DATABASE_URL
async fn test_service_rotation_against_mysql() -> anyhow::Result<()> {
    let (pool, _repo) = setup().await?;
    let jwt = JwtConfig::new("integration-test-secret-0123456789");
    let service = Arc::new(build_token_service(&pool, RoleClaims, &jwt)?);
    let user = test_user();

    let pair = service.issue_token_pair(&user).await?;

    let mut handles = Vec::new();
    for _ in 0..2 {
        let service = service.clone();
        let pair = pair.clone();
        handles.push(tokio::spawn(async move {
            service
                .refresh_token_pair(&pair.access_token, &pair.refresh_token)
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => successes += 1,
            Err(DomainError::Refresh(RefreshFailure::ReusedRefreshToken)) => {}
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(service.repository().count_user_tokens(&user).await?, 1);
    Ok(())
}
