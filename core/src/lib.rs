//! # AuthP Core
//!
//! Domain layer for the AuthP token services.
//! This crate contains the token entities, the error taxonomy, the refresh-token
//! repository interface and the services that mint, validate and rotate tokens.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
