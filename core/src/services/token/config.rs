//! Signing configuration for the token services

use std::fmt;

use authp_shared::config::JwtConfig;
use chrono::Duration;
use tracing::warn;

use crate::errors::DomainError;

/// Keys shorter than this are accepted with a warning (128 bits)
const RECOMMENDED_KEY_BYTES: usize = 16;

/// Upper bound for either token lifetime (100 years)
pub const MAX_TOKEN_LIFETIME_DAYS: i64 = 36_525;

/// Issuer, audience, signing secret and token lifetimes
///
/// Built once at startup and shared read-only, usually behind an `Arc`.
#[derive(Clone)]
pub struct SigningConfig {
    issuer: String,
    audience: String,
    signing_key: Vec<u8>,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl SigningConfig {
    /// Creates a validated signing configuration
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the key, issuer or audience is
    /// empty, or if either lifetime is not strictly positive or exceeds
    /// `MAX_TOKEN_LIFETIME_DAYS`
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        signing_key: impl Into<Vec<u8>>,
        access_token_ttl: Duration,
        refresh_token_ttl: Duration,
    ) -> Result<Self, DomainError> {
        let issuer = issuer.into();
        let audience = audience.into();
        let signing_key = signing_key.into();

        if signing_key.is_empty() {
            return Err(invalid("signing key must not be empty"));
        }
        if issuer.trim().is_empty() {
            return Err(invalid("issuer must not be empty"));
        }
        if audience.trim().is_empty() {
            return Err(invalid("audience must not be empty"));
        }
        if access_token_ttl <= Duration::zero() {
            return Err(invalid("access token lifetime must be positive"));
        }
        if refresh_token_ttl <= Duration::zero() {
            return Err(invalid("refresh token lifetime must be positive"));
        }
        let max_lifetime = Duration::days(MAX_TOKEN_LIFETIME_DAYS);
        if access_token_ttl > max_lifetime {
            return Err(invalid("access token lifetime is too long"));
        }
        if refresh_token_ttl > max_lifetime {
            return Err(invalid("refresh token lifetime is too long"));
        }

        if signing_key.len() < RECOMMENDED_KEY_BYTES {
            warn!(
                key_bytes = signing_key.len(),
                "Signing key is shorter than the recommended {} bytes", RECOMMENDED_KEY_BYTES
            );
        }

        Ok(Self {
            issuer,
            audience,
            signing_key,
            access_token_ttl,
            refresh_token_ttl,
        })
    }

    /// Builds the signing configuration from the JWT settings
    pub fn from_jwt_config(config: &JwtConfig) -> Result<Self, DomainError> {
        if config.is_using_default_secret() {
            warn!("JWT secret is the built-in development default");
        }

        Self::new(
            config.issuer.clone(),
            config.audience.clone(),
            config.secret.as_bytes(),
            lifetime_seconds(config.access_token_expiry, "access token")?,
            lifetime_seconds(config.refresh_token_expiry, "refresh token")?,
        )
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub(crate) fn signing_key(&self) -> &[u8] {
        &self.signing_key
    }

    /// Lifetime of an access token from its issue time
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    /// Lifetime of a refresh token from its creation time
    pub fn refresh_token_ttl(&self) -> Duration {
        self.refresh_token_ttl
    }
}

// The key never appears in debug output
impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("signing_key", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

fn lifetime_seconds(seconds: i64, token: &str) -> Result<Duration, DomainError> {
    Duration::try_seconds(seconds).ok_or_else(|| DomainError::Validation {
        message: format!("{} lifetime of {} seconds is out of range", token, seconds),
    })
}

fn invalid(message: &str) -> DomainError {
    DomainError::Validation {
        message: message.to_string(),
    }
}
