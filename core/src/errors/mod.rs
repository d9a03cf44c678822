//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

// Re-export all error types
pub use types::{ClaimsError, ErrorResponse, Outcome, RefreshFailure, TokenError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Duplicate key: {key}")]
    DuplicateKey { key: String },

    /// A correctly signed token is missing data the issuance path always writes
    #[error("Integrity violation: {message}")]
    IntegrityViolation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Refresh(#[from] RefreshFailure),

    #[error(transparent)]
    Claims(#[from] ClaimsError),
}

impl DomainError {
    /// Classify the error for the caller
    pub fn outcome(&self) -> Outcome {
        match self {
            DomainError::Validation { .. } | DomainError::NotFound { .. } => Outcome::ClientError,
            DomainError::Claims(ClaimsError::UserNotFound { .. }) => Outcome::ClientError,
            DomainError::Refresh(failure) => failure.outcome(),
            DomainError::Token(e) if e.is_invalid() => Outcome::AuthorizationError,
            DomainError::Token(_)
            | DomainError::Claims(_)
            | DomainError::DuplicateKey { .. }
            | DomainError::IntegrityViolation { .. }
            | DomainError::Internal { .. } => Outcome::InternalError,
        }
    }

    /// True for errors that indicate a bug or broken infrastructure rather
    /// than client behaviour
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DomainError::IntegrityViolation { .. } | DomainError::Internal { .. }
        )
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::DuplicateKey { .. } => "DUPLICATE_KEY",
            DomainError::IntegrityViolation { .. } => "INTEGRITY_VIOLATION",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
            DomainError::Token(e) => e.code(),
            DomainError::Refresh(f) => f.code(),
            DomainError::Claims(ClaimsError::UserNotFound { .. }) => "USER_NOT_FOUND",
            DomainError::Claims(ClaimsError::Unavailable { .. }) => "CLAIMS_UNAVAILABLE",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
