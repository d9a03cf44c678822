//! Domain entities representing claims and tokens.

pub mod claim;
pub mod token;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use claim::{Claim, ClaimSet, RESERVED_CLAIMS, SUBJECT_CLAIM};
pub use token::{
    redact, AccessTokenClaims, RefreshToken, RefreshTokenState, TokenPair,
    MAX_REFRESH_TOKEN_VALUE_LEN, MAX_USER_ID_LEN, REFRESH_TOKEN_VALUE_BYTES,
};
