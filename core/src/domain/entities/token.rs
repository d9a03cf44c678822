//! Token entities for JWT-based authentication.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

use super::claim::ClaimSet;

/// Random bytes behind each refresh token value (256 bits)
pub const REFRESH_TOKEN_VALUE_BYTES: usize = 32;

/// Storage cap on a refresh token value
pub const MAX_REFRESH_TOKEN_VALUE_LEN: usize = 50;

/// Storage cap on a user identifier
pub const MAX_USER_ID_LEN: usize = 256;

/// JWT payload of an access token
///
/// Registered fields are explicit; every other claim is flattened in from
/// the claim set, including the subject claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issued at timestamp
    pub iat: i64,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Claims describing the subject
    #[serde(flatten)]
    pub claims: ClaimSet,
}

impl AccessTokenClaims {
    /// Creates the payload for a new access token with a fresh token identifier
    pub fn new(
        issuer: &str,
        audience: &str,
        claims: ClaimSet,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            iss: issuer.to_string(),
            aud: audience.to_string(),
            exp: issued_at
                .checked_add_signed(lifetime)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
            nbf: issued_at.timestamp(),
            iat: issued_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            claims,
        }
    }

    /// Gets the subject's user identifier
    pub fn subject(&self) -> Option<&str> {
        self.claims.subject()
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Lifecycle state of a refresh token record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    /// Usable exactly once to obtain a new pair
    Active,
    /// Already exchanged (or administratively invalidated)
    Consumed,
    /// Older than the refresh-token lifetime
    Expired,
}

/// Refresh token record stored in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Opaque random value; primary key
    pub value: String,

    /// User this token was issued to
    pub user_id: String,

    /// Identifier of the access token issued alongside
    pub access_token_id: String,

    /// Set once the token has been exchanged or revoked
    pub is_invalid: bool,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Creates a new refresh token with a freshly generated value
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user the token is bound to
    /// * `access_token_id` - `jti` of the access token issued with it
    ///
    /// # Returns
    ///
    /// A new active `RefreshToken`, or a validation error if `user_id` is
    /// empty or longer than [`MAX_USER_ID_LEN`]
    pub fn generate(
        user_id: impl Into<String>,
        access_token_id: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let user_id = user_id.into();
        if user_id.is_empty() || user_id.len() > MAX_USER_ID_LEN {
            return Err(DomainError::Validation {
                message: format!(
                    "user id must be between 1 and {} characters",
                    MAX_USER_ID_LEN
                ),
            });
        }

        Ok(Self {
            value: Self::new_value(),
            user_id,
            access_token_id: access_token_id.into(),
            is_invalid: false,
            created_at: Utc::now(),
        })
    }

    /// Generates an unpredictable URL-safe token value
    pub fn new_value() -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_VALUE_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Replaces the value, keeping every other field
    pub fn regenerate_value(&mut self) {
        self.value = Self::new_value();
    }

    /// Time after which the token can no longer be exchanged
    pub fn expires_at(&self, lifetime: Duration) -> DateTime<Utc> {
        self.created_at
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Checks if the token is older than `lifetime`
    pub fn is_expired(&self, lifetime: Duration) -> bool {
        self.is_expired_at(lifetime, Utc::now())
    }

    pub fn is_expired_at(&self, lifetime: Duration, now: DateTime<Utc>) -> bool {
        now > self.expires_at(lifetime)
    }

    /// Marks the token as used
    pub fn mark_invalid(&mut self) {
        self.is_invalid = true;
    }

    /// Current lifecycle state; consumption takes precedence over expiry
    pub fn state(&self, lifetime: Duration) -> RefreshTokenState {
        if self.is_invalid {
            RefreshTokenState::Consumed
        } else if self.is_expired(lifetime) {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// Opaque refresh token value
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_lifetime: Duration,
        refresh_lifetime: Duration,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in: access_lifetime.num_seconds(),
            refresh_expires_in: refresh_lifetime.num_seconds(),
        }
    }
}

/// Shortened form of a secret value, safe for log correlation
pub fn redact(value: &str) -> String {
    let prefix: String = value.chars().take(6).collect();
    format!("{}…", prefix)
}
