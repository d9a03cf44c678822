//! Token cleanup service for periodic retention of refresh token records
//!
//! Consumed refresh tokens are kept so a replay can be detected. This module
//! deletes records once they are older than the retention window, which is
//! never shorter than the refresh token lifetime.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use crate::errors::DomainError;
use crate::repositories::RefreshTokenRepository;

/// Configuration for token cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// How long records are kept after creation (in days)
    pub retention_days: i64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            retention_days: 30,
            enabled: true,
        }
    }
}

/// Service for deleting refresh token records past retention
pub struct TokenCleanupService<R: RefreshTokenRepository + 'static> {
    repository: Arc<R>,
    config: TokenCleanupConfig,
    retention: Duration,
}

impl<R: RefreshTokenRepository + 'static> TokenCleanupService<R> {
    /// Create a new token cleanup service
    ///
    /// `refresh_token_ttl` is the lower bound for the retention window; a
    /// shorter configured retention is raised to it.
    pub fn new(
        repository: Arc<R>,
        config: TokenCleanupConfig,
        refresh_token_ttl: Duration,
    ) -> Self {
        let configured = Duration::try_days(config.retention_days).unwrap_or(Duration::MAX);
        let retention = if configured < refresh_token_ttl {
            warn!(
                retention_days = config.retention_days,
                refresh_ttl_seconds = refresh_token_ttl.num_seconds(),
                "Cleanup retention shorter than refresh token lifetime, using the lifetime"
            );
            refresh_token_ttl
        } else {
            configured
        };

        Self {
            repository,
            config,
            retention,
        }
    }

    /// Effective retention window
    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Run a single cleanup cycle
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of cleanup operations
    /// * `Err(DomainError)` - If cleanup fails
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        info!("Starting token cleanup cycle");

        let mut result = CleanupResult::default();
        let Some(cutoff) = Utc::now().checked_sub_signed(self.retention) else {
            info!("Retention window reaches past the earliest timestamp, nothing to delete");
            return Ok(result);
        };

        match self.repository.delete_created_before(cutoff).await {
            Ok(count) => {
                result.tokens_deleted = count;
                info!(count, cutoff = %cutoff, "Deleted refresh tokens past retention");
            }
            Err(e) => {
                error!("Failed to cleanup refresh tokens: {}", e);
                result.errors.push(format!("Token cleanup error: {}", e));
            }
        }

        Ok(result)
    }

    /// Start the cleanup service as a background task
    ///
    /// This spawns a tokio task that runs cleanup at regular intervals
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Token cleanup service is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                "Token cleanup service started - will run every {} seconds",
                interval.as_secs()
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.errors.is_empty() {
                            warn!("Cleanup completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Token cleanup cycle failed: {}", e);
                    }
                }
            }
        }))
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of refresh token records deleted
    pub tokens_deleted: usize,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
