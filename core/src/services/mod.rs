//! Business services containing domain logic and use cases.

pub mod claims;
pub mod token;

// Re-export commonly used types
pub use claims::ClaimsSource;
pub use token::{
    CleanupResult, MintedToken, SigningConfig, TokenCleanupConfig, TokenCleanupService,
    TokenCodec, TokenService, ValidatedToken,
};
