//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - Signing configuration shared by every component
//! - JWT access token minting and validation
//! - Refresh token issuance and one-time rotation
//! - Background retention cleanup of refresh token records

mod cleanup;
mod codec;
mod config;
mod service;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use codec::{MintedToken, TokenCodec, ValidatedToken};
pub use config::{SigningConfig, MAX_TOKEN_LIFETIME_DAYS};
pub use service::TokenService;
