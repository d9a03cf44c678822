//! Claims source abstraction
//!
//! The mapping from a user to the claims embedded in their tokens lives
//! outside this crate. `TokenService` receives an implementation at
//! construction time.

use async_trait::async_trait;

use crate::domain::entities::claim::ClaimSet;
use crate::errors::ClaimsError;

/// Produces the claims to embed in a user's access token
#[async_trait]
pub trait ClaimsSource: Send + Sync {
    /// Compute the claim set for `user_id`
    ///
    /// The returned set need not contain the subject claim; the codec adds it.
    ///
    /// # Returns
    /// * `Ok(ClaimSet)` - Claims for the user
    /// * `Err(ClaimsError::UserNotFound)` - No such user
    /// * `Err(ClaimsError::Unavailable)` - The backing source failed
    async fn get_claims(&self, user_id: &str) -> Result<ClaimSet, ClaimsError>;
}

#[async_trait]
impl<T: ClaimsSource + ?Sized> ClaimsSource for std::sync::Arc<T> {
    async fn get_claims(&self, user_id: &str) -> Result<ClaimSet, ClaimsError> {
        (**self).get_claims(user_id).await
    }
}
