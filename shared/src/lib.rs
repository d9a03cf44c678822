//! Shared configuration types for the AuthP token services
//!
//! This crate holds the serializable configuration used across the workspace:
//! - JWT issuance settings (issuer, audience, secret, lifetimes)
//! - Database connection settings
//! - Environment detection and logging configuration

pub mod config;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, DatabaseConfig, Environment, JwtConfig, LogFormat, LoggingConfig,
};
