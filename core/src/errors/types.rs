//! Error types for token validation, refresh rotation and claim lookup
//!
//! Every failure here is an ordinary value returned to the caller. `Outcome`
//! classifies results for an HTTP-style caller that maps them to status codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token encoding and validation errors
///
/// The validation-side variants together form the codec's `Invalid` outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token declares an unexpected signing algorithm")]
    InvalidAlgorithm,

    #[error("Token issuer does not match")]
    InvalidIssuer,

    #[error("Token audience does not match")]
    InvalidAudience,

    #[error("Token expired")]
    Expired,

    #[error("Token not yet valid")]
    NotYetValid,

    #[error("Claim type is reserved for registered token fields: {claim}")]
    ReservedClaim { claim: String },

    #[error("Token subject must not be empty")]
    EmptySubject,

    #[error("Token generation failed: {message}")]
    GenerationFailed { message: String },
}

impl TokenError {
    /// True when the error came from validating a presented token
    pub fn is_invalid(&self) -> bool {
        !matches!(
            self,
            TokenError::ReservedClaim { .. }
                | TokenError::EmptySubject
                | TokenError::GenerationFailed { .. }
        )
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::Malformed => "TOKEN_MALFORMED",
            TokenError::InvalidSignature => "TOKEN_INVALID_SIGNATURE",
            TokenError::InvalidAlgorithm => "TOKEN_INVALID_ALGORITHM",
            TokenError::InvalidIssuer => "TOKEN_INVALID_ISSUER",
            TokenError::InvalidAudience => "TOKEN_INVALID_AUDIENCE",
            TokenError::Expired => "TOKEN_EXPIRED",
            TokenError::NotYetValid => "TOKEN_NOT_YET_VALID",
            TokenError::ReservedClaim { .. } => "TOKEN_RESERVED_CLAIM",
            TokenError::EmptySubject => "TOKEN_EMPTY_SUBJECT",
            TokenError::GenerationFailed { .. } => "TOKEN_GENERATION_FAILED",
        }
    }
}

/// Reasons a refresh request is refused
///
/// All of them are recovered by making the client authenticate again.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshFailure {
    #[error("Access token failed validation")]
    InvalidAccessToken,

    #[error("Refresh token not recognised")]
    UnknownRefreshToken,

    #[error("Refresh token has already been used")]
    ReusedRefreshToken,

    #[error("Refresh token expired")]
    ExpiredRefreshToken,
}

impl RefreshFailure {
    /// Classify the failure for the caller
    pub fn outcome(&self) -> Outcome {
        match self {
            RefreshFailure::InvalidAccessToken | RefreshFailure::UnknownRefreshToken => {
                Outcome::ClientError
            }
            RefreshFailure::ReusedRefreshToken | RefreshFailure::ExpiredRefreshToken => {
                Outcome::AuthorizationError
            }
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            RefreshFailure::InvalidAccessToken => "REFRESH_INVALID_ACCESS_TOKEN",
            RefreshFailure::UnknownRefreshToken => "REFRESH_UNKNOWN_TOKEN",
            RefreshFailure::ReusedRefreshToken => "REFRESH_TOKEN_REUSED",
            RefreshFailure::ExpiredRefreshToken => "REFRESH_TOKEN_EXPIRED",
        }
    }
}

/// Errors raised by a claims source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("Claims source unavailable: {message}")]
    Unavailable { message: String },
}

/// Result classification for an HTTP-style caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    ClientError,
    AuthorizationError,
    InternalError,
}

impl Outcome {
    /// Conventional HTTP status code for the outcome
    pub fn status_code(&self) -> u16 {
        match self {
            Outcome::Success => 200,
            Outcome::ClientError => 400,
            Outcome::AuthorizationError => 401,
            Outcome::InternalError => 500,
        }
    }

    /// Classify any service result
    pub fn of<T>(result: &Result<T, super::DomainError>) -> Self {
        match result {
            Ok(_) => Outcome::Success,
            Err(e) => e.outcome(),
        }
    }
}

/// Error body for an HTTP-style caller
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl ToString, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl From<&super::DomainError> for ErrorResponse {
    fn from(err: &super::DomainError) -> Self {
        // Fatal errors keep their detail in the logs, not in the response body
        if err.outcome() == Outcome::InternalError {
            return ErrorResponse::new(err.code(), "Internal server error");
        }
        ErrorResponse::new(err.code(), err)
    }
}
