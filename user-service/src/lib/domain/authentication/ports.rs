use async_trait::async_trait;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::IssuedToken;
use crate::domain::authentication::models::LoginCommand;
use crate::domain::authentication::models::VerifiedIdentity;

/// Port consumed by inbound adapters to authenticate callers.
#[async_trait]
pub trait AuthenticationPort: Send + Sync + 'static {
    /// Resolve the raw `Authorization` header value to a verified identity.
    ///
    /// # Arguments
    /// * `authorization` - Header value, `None` when the header is absent
    ///
    /// # Errors
    /// * `Unauthenticated` - Any credential problem, reason kept for logs only
    /// * `Unavailable` - Storage could not be reached
    async fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<VerifiedIdentity, AuthError>;

    /// Exchange email and password for an access token.
    ///
    /// # Errors
    /// * `Unauthenticated` - Unknown email or wrong password (indistinguishable)
    /// * `Unavailable` - Storage could not be reached
    /// * `Internal` - Token could not be signed
    async fn login(&self, command: LoginCommand) -> Result<IssuedToken, AuthError>;
}
