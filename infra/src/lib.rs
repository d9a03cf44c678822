//! # Infrastructure Layer
//!
//! Concrete implementations behind the AuthP token services:
//! - **Database**: MySQL refresh token repository using SQLx
//! - **Configuration**: `.env` loading on top of the shared configuration types
//! - **Telemetry**: `tracing` subscriber setup
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use std::sync::Arc;

use authp_core::{ClaimsSource, DomainError, SigningConfig, TokenService};
use authp_shared::config::{AppConfig, Environment, JwtConfig};

// Re-export core types for convenience
pub use authp_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Tracing subscriber initialisation
pub mod telemetry;

#[cfg(feature = "mysql")]
use database::{DatabasePool, MySqlTokenRepository};

/// Load application configuration from the environment
///
/// Reads the environment-specific `.env` file, then `.env`, then builds the
/// configuration from process variables. Problems that would make tokens
/// unsafe are fatal in production and logged as warnings otherwise.
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    let environment = Environment::from_env();
    dotenvy::from_filename(environment.env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    let problems = config.startup_problems();
    if !problems.is_empty() {
        if config.environment.is_production() {
            return Err(InfrastructureError::Config(problems.join("; ")));
        }
        for problem in &problems {
            tracing::warn!(environment = %config.environment, "Configuration problem: {}", problem);
        }
    }

    Ok(config)
}

/// Build the signing configuration, surfacing invalid settings at startup
pub fn signing_config(jwt: &JwtConfig) -> Result<Arc<SigningConfig>, InfrastructureError> {
    SigningConfig::from_jwt_config(jwt)
        .map(Arc::new)
        .map_err(|e| InfrastructureError::Config(e.to_string()))
}

/// Wire a MySQL-backed token service
///
/// # Arguments
/// * `pool` - Connected database pool
/// * `claims_source` - Computes the claims for newly issued tokens
/// * `jwt` - Signing settings
#[cfg(feature = "mysql")]
pub fn build_token_service<C: ClaimsSource>(
    pool: &DatabasePool,
    claims_source: C,
    jwt: &JwtConfig,
) -> Result<TokenService<MySqlTokenRepository, C>, InfrastructureError> {
    let config = signing_config(jwt)?;
    let repository = MySqlTokenRepository::new(pool.get_pool().clone());

    tracing::info!(
        issuer = config.issuer(),
        audience = config.audience(),
        access_ttl_seconds = config.access_token_ttl().num_seconds(),
        refresh_ttl_seconds = config.refresh_token_ttl().num_seconds(),
        "Token service configured"
    );

    Ok(TokenService::new(repository, claims_source, config))
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure
    #[cfg(feature = "mysql")]
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Telemetry setup error
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// Domain error raised while wiring services
    #[error(transparent)]
    Domain(#[from] DomainError),
}
