//! Repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for RefreshToken persistence operations
///
/// Records are keyed by their opaque value and are never deleted by the
/// token lifecycle itself; consumed tokens stay behind so a replay can be
/// recognised.
///
/// # Consistency
/// - `insert` must fail with `DomainError::DuplicateKey` on a value collision
/// - `rotate` is the critical section of the refresh flow and must be atomic:
///   either the consumed record is invalidated and the replacement inserted,
///   or nothing changes
/// - store operations are bounded by the backend's own timeouts
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new refresh token
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The stored token
    /// * `Err(DomainError::DuplicateKey)` - A token with the same value exists
    /// * `Err(DomainError)` - Storage failure
    async fn insert(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its value
    ///
    /// # Returns
    /// * `Ok(Some(RefreshToken))` - Token found, whatever its state
    /// * `Ok(None)` - No token with this value
    /// * `Err(DomainError)` - Storage failure
    async fn find_by_value(&self, value: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Mark a refresh token invalid
    ///
    /// # Returns
    /// * `Ok(true)` - The token moved from valid to invalid
    /// * `Ok(false)` - Token not found or already invalid
    /// * `Err(DomainError)` - Storage failure
    async fn mark_invalid(&self, value: &str) -> Result<bool, DomainError>;

    /// Atomically consume one token and store its replacement
    ///
    /// The consumed record is switched to invalid only if it is currently
    /// valid (compare-and-set on the flag); the replacement is inserted in the
    /// same unit of work.
    ///
    /// # Arguments
    /// * `consumed_value` - Value of the token being exchanged
    /// * `replacement` - The new token to persist
    ///
    /// # Returns
    /// * `Ok(true)` - Rotation applied
    /// * `Ok(false)` - The consumed token was already invalid; nothing changed
    /// * `Err(DomainError::NotFound)` - The consumed token does not exist
    /// * `Err(DomainError::DuplicateKey)` - Replacement value collides; nothing changed
    /// * `Err(DomainError)` - Storage failure; nothing changed
    async fn rotate(
        &self,
        consumed_value: &str,
        replacement: RefreshToken,
    ) -> Result<bool, DomainError>;

    /// Find all valid refresh tokens for a user
    ///
    /// # Returns
    /// * `Ok(Vec<RefreshToken>)` - Tokens not yet marked invalid, newest first
    /// * `Err(DomainError)` - Storage failure
    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<RefreshToken>, DomainError>;

    /// Mark every valid refresh token of a user invalid
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of tokens invalidated
    /// * `Err(DomainError)` - Storage failure
    async fn revoke_all_user_tokens(&self, user_id: &str) -> Result<usize, DomainError>;

    /// Delete records created before `cutoff`
    ///
    /// Retention cleanup only. Callers must keep `cutoff` older than the
    /// refresh-token lifetime or replayed tokens would read as unknown.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records deleted
    /// * `Err(DomainError)` - Storage failure
    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Count valid tokens for a user
    async fn count_user_tokens(&self, user_id: &str) -> Result<usize, DomainError> {
        let tokens = self.find_by_user_id(user_id).await?;
        Ok(tokens.len())
    }
}
