//! Main token service implementation

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::entities::token::{redact, RefreshToken, TokenPair};
use crate::errors::{DomainError, RefreshFailure};
use crate::repositories::RefreshTokenRepository;
use crate::services::claims::ClaimsSource;

use super::codec::{MintedToken, TokenCodec, ValidatedToken};
use super::config::SigningConfig;

/// Issues access tokens and rotates refresh tokens
///
/// Every refresh token is single-use: exchanging it invalidates it and
/// stores its replacement in one atomic repository call, so a replayed value
/// is recognised as reused.
pub struct TokenService<R: RefreshTokenRepository, C: ClaimsSource> {
    pub(crate) repository: R,
    claims_source: C,
    codec: TokenCodec,
}

impl<R: RefreshTokenRepository, C: ClaimsSource> TokenService<R, C> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Refresh token repository for persistence
    /// * `claims_source` - Computes the claims embedded in new tokens
    /// * `config` - Shared signing configuration
    pub fn new(repository: R, claims_source: C, config: Arc<SigningConfig>) -> Self {
        Self {
            repository,
            claims_source,
            codec: TokenCodec::new(config),
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn config(&self) -> &SigningConfig {
        self.codec.config()
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Issues an access token without a refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The signed access token
    /// * `Err(DomainError::Claims)` - The claims source failed or the user is unknown
    /// * `Err(DomainError::Token)` - Minting failed
    pub async fn issue_token(&self, user_id: &str) -> Result<String, DomainError> {
        let minted = self.mint_for_user(user_id).await?;
        Ok(minted.token)
    }

    /// Issues an access token and a fresh refresh token
    ///
    /// Starts a new lineage; the refresh token is bound to `user_id` and the
    /// access token's identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The generated token pair
    /// * `Err(DomainError)` - Claims lookup, minting or persistence failed
    pub async fn issue_token_pair(&self, user_id: &str) -> Result<TokenPair, DomainError> {
        let minted = self.mint_for_user(user_id).await?;

        let refresh_token = RefreshToken::generate(user_id, minted.token_id.clone())?;
        let refresh_token = self.insert_refresh_token(refresh_token).await?;

        debug!(
            user_id,
            token_id = %minted.token_id,
            refresh_token = %redact(&refresh_token.value),
            "Issued token pair"
        );

        Ok(self.token_pair(minted, refresh_token))
    }

    /// Exchanges an access token and its refresh token for a new pair
    ///
    /// The access token may be expired but must otherwise be valid. The new
    /// access token carries exactly the claims of the presented one; the
    /// claims source is not consulted.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The rotated pair
    /// * `Err(DomainError::Refresh)` - The request was refused, see `RefreshFailure`
    /// * `Err(DomainError::IntegrityViolation)` - A correctly signed token has no subject
    /// * `Err(DomainError)` - Minting or persistence failed
    pub async fn refresh_token_pair(
        &self,
        access_token: &str,
        refresh_value: &str,
    ) -> Result<TokenPair, DomainError> {
        let validated = self.codec.validate(access_token, true).map_err(|e| {
            warn!(reason = e.code(), "Refresh rejected: access token failed validation");
            RefreshFailure::InvalidAccessToken
        })?;

        let record = self
            .repository
            .find_by_value(refresh_value)
            .await?
            .ok_or_else(|| {
                warn!(
                    refresh_token = %redact(refresh_value),
                    token_id = %validated.token_id,
                    "Refresh rejected: unknown refresh token"
                );
                RefreshFailure::UnknownRefreshToken
            })?;

        if record.is_invalid {
            warn!(
                user_id = %record.user_id,
                refresh_token = %redact(refresh_value),
                "Refresh token reuse detected"
            );
            return Err(RefreshFailure::ReusedRefreshToken.into());
        }

        let refresh_ttl = self.codec.config().refresh_token_ttl();
        if record.is_expired(refresh_ttl) {
            info!(
                user_id = %record.user_id,
                expired_at = %record.expires_at(refresh_ttl),
                "Refresh rejected: refresh token expired"
            );
            return Err(RefreshFailure::ExpiredRefreshToken.into());
        }

        let user_id = self.subject_of(&validated)?;
        if record.user_id != user_id {
            warn!(
                user_id,
                record_user_id = %record.user_id,
                "Refresh token was issued to a different user than the access token subject"
            );
        }

        let minted = self.codec.mint(user_id, &validated.claims)?;
        let replacement = RefreshToken::generate(user_id, minted.token_id.clone())?;
        let replacement = self.rotate_refresh_token(refresh_value, replacement).await?;

        info!(
            user_id,
            previous_token_id = %validated.token_id,
            token_id = %minted.token_id,
            "Rotated refresh token"
        );

        Ok(self.token_pair(minted, replacement))
    }

    /// Strictly validates an access token for bearer authentication
    ///
    /// # Returns
    ///
    /// * `Ok(ValidatedToken)` - The token's claims
    /// * `Err(DomainError::Token)` - The token is invalid or expired
    pub fn validate_access_token(&self, token: &str) -> Result<ValidatedToken, DomainError> {
        Ok(self.codec.validate(token, false)?)
    }

    /// Revokes a specific refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(bool)` - True if the token was valid and is now revoked
    /// * `Err(DomainError)` - Revocation failed
    pub async fn revoke_refresh_token(&self, refresh_value: &str) -> Result<bool, DomainError> {
        let revoked = self.repository.mark_invalid(refresh_value).await?;
        if revoked {
            info!(refresh_token = %redact(refresh_value), "Revoked refresh token");
        }
        Ok(revoked)
    }

    /// Revokes all refresh tokens for a user, forcing re-authentication
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of tokens revoked
    /// * `Err(DomainError)` - Revocation failed
    pub async fn revoke_user_tokens(&self, user_id: &str) -> Result<usize, DomainError> {
        let count = self.repository.revoke_all_user_tokens(user_id).await?;
        info!(user_id, count, "Revoked user refresh tokens");
        Ok(count)
    }

    async fn mint_for_user(&self, user_id: &str) -> Result<MintedToken, DomainError> {
        let claims = self.claims_source.get_claims(user_id).await?;
        Ok(self.codec.mint(user_id, &claims)?)
    }

    fn subject_of<'a>(&self, validated: &'a ValidatedToken) -> Result<&'a str, DomainError> {
        match validated.subject() {
            Some(subject) if !subject.is_empty() => Ok(subject),
            _ => {
                error!(
                    token_id = %validated.token_id,
                    "Validated access token carries no subject claim"
                );
                Err(DomainError::IntegrityViolation {
                    message: format!("token {} has no subject claim", validated.token_id),
                })
            }
        }
    }

    /// Stores a new refresh token, regenerating its value once on collision
    async fn insert_refresh_token(
        &self,
        mut token: RefreshToken,
    ) -> Result<RefreshToken, DomainError> {
        match self.repository.insert(token.clone()).await {
            Err(DomainError::DuplicateKey { key }) => {
                warn!(key = %key, "Refresh token value collision, regenerating");
                token.regenerate_value();
                self.repository.insert(token).await
            }
            other => other,
        }
    }

    /// Consumes `refresh_value` and stores `replacement` atomically,
    /// regenerating the replacement value once on collision
    async fn rotate_refresh_token(
        &self,
        refresh_value: &str,
        mut replacement: RefreshToken,
    ) -> Result<RefreshToken, DomainError> {
        let mut retried = false;
        loop {
            match self.repository.rotate(refresh_value, replacement.clone()).await {
                Ok(true) => return Ok(replacement),
                Ok(false) => {
                    warn!(
                        user_id = %replacement.user_id,
                        refresh_token = %redact(refresh_value),
                        "Refresh token reuse detected during rotation"
                    );
                    return Err(RefreshFailure::ReusedRefreshToken.into());
                }
                Err(DomainError::NotFound { .. }) => {
                    warn!(
                        refresh_token = %redact(refresh_value),
                        "Refresh token disappeared during rotation"
                    );
                    return Err(RefreshFailure::UnknownRefreshToken.into());
                }
                Err(DomainError::DuplicateKey { key }) if !retried => {
                    warn!(key = %key, "Refresh token value collision, regenerating");
                    replacement.regenerate_value();
                    retried = true;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn token_pair(&self, minted: MintedToken, refresh_token: RefreshToken) -> TokenPair {
        let config = self.codec.config();
        TokenPair::new(
            minted.token,
            refresh_token.value,
            config.access_token_ttl(),
            config.refresh_token_ttl(),
        )
    }
}
