//! JWT encoding and validation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::domain::entities::claim::{ClaimSet, SUBJECT_CLAIM};
use crate::domain::entities::token::AccessTokenClaims;
use crate::errors::TokenError;

use super::config::SigningConfig;

/// The only algorithm minted or accepted
const ALGORITHM: Algorithm = Algorithm::HS256;

/// A freshly signed access token
#[derive(Debug, Clone)]
pub struct MintedToken {
    /// Compact serialized JWT
    pub token: String,
    /// The token's `jti`
    pub token_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Claims recovered from a verified access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedToken {
    /// Every non-registered claim, including the subject
    pub claims: ClaimSet,
    /// The token's `jti`
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

impl ValidatedToken {
    pub fn subject(&self) -> Option<&str> {
        self.claims.subject()
    }
}

/// Mints and validates HS256 access tokens against one signing configuration
///
/// Stateless apart from the derived keys; safe to share across tasks.
#[derive(Clone)]
pub struct TokenCodec {
    config: Arc<SigningConfig>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validation_ignoring_expiry: Validation,
}

impl TokenCodec {
    /// Creates a codec for the given signing configuration
    pub fn new(config: Arc<SigningConfig>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.signing_key());
        let decoding_key = DecodingKey::from_secret(config.signing_key());

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[config.issuer()]);
        validation.set_audience(&[config.audience()]);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let mut validation_ignoring_expiry = validation.clone();
        validation_ignoring_expiry.validate_exp = false;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
            validation_ignoring_expiry,
        }
    }

    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    /// Mints a signed access token for `user_id`
    ///
    /// The subject claim is always set to `user_id`, overwriting any subject
    /// already in `claims`.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The subject's user identifier
    /// * `claims` - Claims to embed
    ///
    /// # Returns
    ///
    /// * `Ok(MintedToken)` - The signed token and its metadata
    /// * `Err(TokenError::EmptySubject)` - `user_id` is empty
    /// * `Err(TokenError::ReservedClaim)` - A claim type shadows a registered field
    /// * `Err(TokenError::GenerationFailed)` - Signing failed
    pub fn mint(&self, user_id: &str, claims: &ClaimSet) -> Result<MintedToken, TokenError> {
        if user_id.is_empty() {
            return Err(TokenError::EmptySubject);
        }
        if let Some(claim) = claims.reserved_claim() {
            return Err(TokenError::ReservedClaim {
                claim: claim.to_string(),
            });
        }

        let claims = claims.clone().with(SUBJECT_CLAIM, user_id);
        let issued_at = Utc::now();
        let payload = AccessTokenClaims::new(
            self.config.issuer(),
            self.config.audience(),
            claims,
            issued_at,
            self.config.access_token_ttl(),
        );

        let token = encode(&Header::new(ALGORITHM), &payload, &self.encoding_key).map_err(|e| {
            TokenError::GenerationFailed {
                message: e.to_string(),
            }
        })?;

        debug!(token_id = %payload.jti, user_id, "Minted access token");

        Ok(MintedToken {
            token,
            expires_at: payload.expires_at(),
            token_id: payload.jti,
            issued_at,
        })
    }

    /// Verifies a token and recovers its claims
    ///
    /// Issuer, audience, signature, header algorithm and `nbf` are always
    /// checked. `exp` is checked unless `ignore_expiry` is set.
    pub fn validate(&self, token: &str, ignore_expiry: bool) -> Result<ValidatedToken, TokenError> {
        let validation = if ignore_expiry {
            &self.validation_ignoring_expiry
        } else {
            &self.validation
        };

        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, validation).map_err(|e| {
            let reason = map_error_kind(e.kind());
            debug!(error = %e, code = reason.code(), ignore_expiry, "Token validation failed");
            reason
        })?;

        let expires_at = data.claims.expires_at();
        Ok(ValidatedToken {
            claims: data.claims.claims,
            token_id: data.claims.jti,
            expires_at,
        })
    }
}

fn map_error_kind(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::ImmatureSignature => TokenError::NotYetValid,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => TokenError::InvalidAlgorithm,
        ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
        ErrorKind::InvalidAudience => TokenError::InvalidAudience,
        _ => TokenError::Malformed,
    }
}
