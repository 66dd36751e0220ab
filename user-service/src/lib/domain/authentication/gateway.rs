use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Claims;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::AuthSettings;
use crate::domain::authentication::models::IssuedToken;
use crate::domain::authentication::models::LoginCommand;
use crate::domain::authentication::models::RejectionReason;
use crate::domain::authentication::models::VerifiedIdentity;
use crate::domain::authentication::ports::AuthenticationPort;
use crate::domain::authentication::resolver::IdentityResolver;
use crate::user::ports::UserRepository;

const BEARER_SCHEME: &str = "Bearer";

/// Password hashed once at startup and verified against when a login names an
/// unknown email, so both failure paths pay the same hashing cost.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Single entry point for authenticating requests and logging users in.
///
/// Immutable after construction and safe to share across any number of
/// concurrent requests.
pub struct AuthGateway<UR>
where
    UR: UserRepository,
{
    resolver: IdentityResolver<UR>,
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    settings: AuthSettings,
    decoy_hash: String,
}

impl<UR> AuthGateway<UR>
where
    UR: UserRepository,
{
    /// Build the gateway.
    ///
    /// # Errors
    /// * `PasswordError` - The decoy hash could not be computed
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        settings: AuthSettings,
    ) -> Result<Self, auth::PasswordError> {
        let decoy_hash = authenticator.hash_password(DECOY_PASSWORD)?;

        Ok(Self {
            resolver: IdentityResolver::new(Arc::clone(&authenticator), Arc::clone(&repository)),
            repository,
            authenticator,
            settings,
            decoy_hash,
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. The token must be a single
/// non-empty word.
pub fn extract_bearer(authorization: Option<&str>) -> Result<&str, RejectionReason> {
    let header = authorization.ok_or(RejectionReason::MalformedCredential)?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(RejectionReason::MalformedCredential)?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(RejectionReason::MalformedCredential);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(RejectionReason::MalformedCredential);
    }

    Ok(token)
}

fn join_error(e: tokio::task::JoinError) -> AuthError {
    tracing::error!(error = %e, "Password verification task failed");
    AuthError::Internal(format!("Failed to join verification task: {e}"))
}

#[async_trait]
impl<UR> AuthenticationPort for AuthGateway<UR>
where
    UR: UserRepository,
{
    async fn authenticate(
        &self,
        authorization: Option<&str>,
    ) -> Result<VerifiedIdentity, AuthError> {
        let token = extract_bearer(authorization).map_err(AuthError::rejected)?;
        self.resolver.resolve(token).await
    }

    async fn login(&self, command: LoginCommand) -> Result<IssuedToken, AuthError> {
        let LoginCommand { email, password } = command;

        let Some(user) = self.repository.find_by_email(&email).await? else {
            let authenticator = Arc::clone(&self.authenticator);
            let decoy_hash = self.decoy_hash.clone();
            tokio::task::spawn_blocking(move || {
                authenticator.verify_password(&password, &decoy_hash)
            })
            .await
            .map_err(join_error)?;
            return Err(AuthError::rejected(RejectionReason::UnknownSubject));
        };

        let claims = Claims::for_subject(user.id, self.settings.token_ttl)
            .with_email(&user.email)
            .with_name(&user.name);

        let authenticator = Arc::clone(&self.authenticator);
        let stored_hash = user.password_hash.clone();
        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, &claims)
        })
        .await
        .map_err(join_error)?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => {
                AuthError::rejected(RejectionReason::PasswordMismatch)
            }
            AuthenticationError::JwtError(err) => {
                tracing::error!(error = %err, "Token generation failed");
                AuthError::Internal(err.to_string())
            }
        })?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(IssuedToken {
            access_token: result.access_token,
            token_type: result.token_type,
            identity: user.into(),
        })
    }
}
