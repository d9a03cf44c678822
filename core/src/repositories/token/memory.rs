//! In-memory implementation of RefreshTokenRepository
//!
//! Every operation takes the map lock once, so `rotate` is atomic with
//! respect to all other operations on the same repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::{redact, RefreshToken};
use crate::errors::DomainError;

use super::r#trait::RefreshTokenRepository;

/// In-memory refresh token store
#[derive(Clone, Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl InMemoryTokenRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, valid or not
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    /// Snapshot of every stored record
    pub async fn all(&self) -> Vec<RefreshToken> {
        self.tokens.read().await.values().cloned().collect()
    }
}

fn duplicate(value: &str) -> DomainError {
    DomainError::DuplicateKey {
        key: redact(value),
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryTokenRepository {
    async fn insert(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.value) {
            return Err(duplicate(&token.value));
        }

        tokens.insert(token.value.clone(), token.clone());
        Ok(token)
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(value).cloned())
    }

    async fn mark_invalid(&self, value: &str) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(value) {
            Some(token) if !token.is_invalid => {
                token.mark_invalid();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn rotate(
        &self,
        consumed_value: &str,
        replacement: RefreshToken,
    ) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        // Check the replacement first so a collision leaves the map untouched
        if tokens.contains_key(&replacement.value) {
            return Err(duplicate(&replacement.value));
        }

        let consumed = tokens.get_mut(consumed_value).ok_or_else(|| DomainError::NotFound {
            resource: format!("refresh token {}", redact(consumed_value)),
        })?;
        if consumed.is_invalid {
            return Ok(false);
        }
        consumed.mark_invalid();

        tokens.insert(replacement.value.clone(), replacement);
        Ok(true)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        let mut found: Vec<RefreshToken> = tokens
            .values()
            .filter(|t| t.user_id == user_id && !t.is_invalid)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn revoke_all_user_tokens(&self, user_id: &str) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.user_id == user_id && !token.is_invalid {
                token.mark_invalid();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();

        tokens.retain(|_, token| token.created_at >= cutoff);

        Ok(initial_count - tokens.len())
    }
}
