//! MySQL implementation of the RefreshTokenRepository trait.
//!
//! Refresh tokens are stored by value in `refresh_tokens`. Rotation runs in a
//! transaction: a conditional update flips `is_invalid` only on a valid row,
//! and the replacement is inserted before commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use authp_core::domain::entities::token::{redact, RefreshToken};
use authp_core::errors::DomainError;
use authp_core::repositories::RefreshTokenRepository;

const SELECT_COLUMNS: &str =
    "SELECT token_value, user_id, access_token_id, is_invalid, created_at FROM refresh_tokens";

/// MySQL implementation of RefreshTokenRepository
#[derive(Clone)]
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<RefreshToken, DomainError> {
        Ok(RefreshToken {
            value: row.try_get("token_value")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get token_value: {}", e) })?,
            user_id: row.try_get("user_id")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get user_id: {}", e) })?,
            access_token_id: row.try_get("access_token_id")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get access_token_id: {}", e) })?,
            is_invalid: row.try_get("is_invalid")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get is_invalid: {}", e) })?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get created_at: {}", e) })?,
        })
    }

    /// Map an insert failure, recognising primary key collisions
    fn insert_error(e: sqlx::Error, value: &str) -> DomainError {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::DuplicateKey {
                key: redact(value),
            },
            _ => DomainError::Internal {
                message: format!("Failed to save refresh token: {}", e),
            },
        }
    }

    fn internal(action: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
        move |e| DomainError::Internal {
            message: format!("Failed to {}: {}", action, e),
        }
    }
}

#[async_trait]
impl RefreshTokenRepository for MySqlTokenRepository {
    async fn insert(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                token_value, user_id, access_token_id, is_invalid, created_at
            ) VALUES (?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&token.value)
            .bind(&token.user_id)
            .bind(&token.access_token_id)
            .bind(token.is_invalid)
            .bind(token.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::insert_error(e, &token.value))?;

        Ok(token)
    }

    async fn find_by_value(&self, value: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!("{} WHERE token_value = ? LIMIT 1", SELECT_COLUMNS);

        let result = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::internal("find refresh token"))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn mark_invalid(&self, value: &str) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET is_invalid = TRUE
            WHERE token_value = ? AND is_invalid = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(Self::internal("invalidate refresh token"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn rotate(
        &self,
        consumed_value: &str,
        replacement: RefreshToken,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(Self::internal("begin rotation"))?;

        // Row lock serialises concurrent rotations of the same value
        let consumed = sqlx::query(
            "UPDATE refresh_tokens SET is_invalid = TRUE WHERE token_value = ? AND is_invalid = FALSE",
        )
        .bind(consumed_value)
        .execute(&mut *tx)
        .await
        .map_err(Self::internal("consume refresh token"))?;

        if consumed.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM refresh_tokens WHERE token_value = ?")
                .bind(consumed_value)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Self::internal("look up refresh token"))?
                .is_some();

            tx.rollback()
                .await
                .map_err(Self::internal("roll back rotation"))?;

            return if exists {
                Ok(false)
            } else {
                Err(DomainError::NotFound {
                    resource: format!("refresh token {}", redact(consumed_value)),
                })
            };
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO refresh_tokens (
                token_value, user_id, access_token_id, is_invalid, created_at
            ) VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&replacement.value)
        .bind(&replacement.user_id)
        .bind(&replacement.access_token_id)
        .bind(replacement.is_invalid)
        .bind(replacement.created_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            let err = Self::insert_error(e, &replacement.value);
            tx.rollback()
                .await
                .map_err(Self::internal("roll back rotation"))?;
            return Err(err);
        }

        tx.commit()
            .await
            .map_err(Self::internal("commit rotation"))?;

        Ok(true)
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!(
            "{} WHERE user_id = ? AND is_invalid = FALSE ORDER BY created_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Self::internal("find user tokens"))?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn revoke_all_user_tokens(&self, user_id: &str) -> Result<usize, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET is_invalid = TRUE
            WHERE user_id = ? AND is_invalid = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Self::internal("revoke user tokens"))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(Self::internal("delete old refresh tokens"))?;

        Ok(result.rows_affected() as usize)
    }

    async fn count_user_tokens(&self, user_id: &str) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM refresh_tokens WHERE user_id = ? AND is_invalid = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::internal("count user tokens"))?;

        Ok(count as usize)
    }
}
