use std::sync::Arc;

use auth::Authenticator;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::RejectionReason;
use crate::domain::authentication::models::VerifiedIdentity;
use crate::domain::user::models::UserId;
use crate::user::ports::UserRepository;

/// Turns a bearer token into the identity it names.
///
/// A token is only as good as the record behind it: after the signature and
/// expiry checks pass, the subject is looked up in storage and a token for a
/// deleted user is refused even though it is still cryptographically valid.
pub struct IdentityResolver<UR>
where
    UR: UserRepository,
{
    authenticator: Arc<Authenticator>,
    repository: Arc<UR>,
}

impl<UR> IdentityResolver<UR>
where
    UR: UserRepository,
{
    pub fn new(authenticator: Arc<Authenticator>, repository: Arc<UR>) -> Self {
        Self {
            authenticator,
            repository,
        }
    }

    /// Resolve a token against the current time.
    pub async fn resolve(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        self.resolve_at(token, Utc::now()).await
    }

    /// Resolve a token as of `now`.
    ///
    /// # Errors
    /// * `Unauthenticated` - Bad signature, expired, malformed subject, or unknown subject
    /// * `Unavailable` - Storage lookup failed
    pub async fn resolve_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedIdentity, AuthError> {
        let claims = self
            .authenticator
            .validate_token_at(token, now)
            .map_err(|e| AuthError::rejected(e.into()))?;

        let user_id = UserId::from_string(&claims.sub).map_err(|e| {
            tracing::debug!(error = %e, "Token subject is not a user id");
            AuthError::rejected(RejectionReason::MalformedCredential)
        })?;

        match self.repository.find_by_id(&user_id).await? {
            Some(user) => Ok(user.into()),
            None => {
                tracing::debug!(user_id = %user_id, "Token subject no longer exists");
                Err(AuthError::rejected(RejectionReason::UnknownSubject))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::User;
    use crate::domain::user::models::UserName;
    use crate::user::errors::UserError;
    use crate::user::ports::MockTestUserRepository;

    const SECRET: &[u8] = b"resolver_test_secret_at_least_32_bytes";

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::with_password_hasher(
            SECRET,
            auth::PasswordHasher::with_cost(8, 1, 1).unwrap(),
        ))
    }

    fn stored_user(id: UserId) -> User {
        let now = Utc::now();
        User {
            id,
            name: UserName::new("John Doe".to_string()).unwrap(),
            email: EmailAddress::new("john@example.com".to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn token_for(authenticator: &Authenticator, subject: &str, ttl: Duration) -> String {
        authenticator
            .issue_token(&auth::Claims::for_subject(subject, ttl))
            .unwrap()
    }

    fn expect_reason(result: Result<VerifiedIdentity, AuthError>, reason: RejectionReason) {
        match result {
            Err(AuthError::Unauthenticated(actual)) => assert_eq!(actual, reason),
            other => panic!("expected rejection {:?}, got {:?}", reason, other),
        }
    }

    #[tokio::test]
    async fn test_resolve_existing_subject() {
        let authenticator = authenticator();
        let user_id = UserId::new();
        let user = stored_user(user_id);

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let resolver = IdentityResolver::new(authenticator.clone(), Arc::new(repository));
        let token = token_for(&authenticator, &user_id.to_string(), Duration::minutes(5));

        let identity = resolver.resolve(&token).await.unwrap();
        assert_eq!(identity.id, user_id);
        assert_eq!(identity.email.as_str(), "john@example.com");
    }

    #[tokio::test]
    async fn test_deleted_subject_is_rejected() {
        let authenticator = authenticator();
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let resolver = IdentityResolver::new(authenticator.clone(), Arc::new(repository));
        let token = token_for(&authenticator, &UserId::new().to_string(), Duration::minutes(5));

        expect_reason(
            resolver.resolve(&token).await,
            RejectionReason::UnknownSubject,
        );
    }

    #[tokio::test]
    async fn test_non_uuid_subject_never_reaches_storage() {
        let authenticator = authenticator();
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_id().times(0);

        let resolver = IdentityResolver::new(authenticator.clone(), Arc::new(repository));
        let token = token_for(&authenticator, "user123", Duration::minutes(5));

        expect_reason(
            resolver.resolve(&token).await,
            RejectionReason::MalformedCredential,
        );
    }

    #[tokio::test]
    async fn test_expired_token_never_reaches_storage() {
        let authenticator = authenticator();
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_id().times(0);

        let resolver = IdentityResolver::new(authenticator.clone(), Arc::new(repository));
        let ttl = Duration::minutes(5);
        let token = token_for(&authenticator, &UserId::new().to_string(), ttl);

        expect_reason(
            resolver.resolve_at(&token, Utc::now() + ttl).await,
            RejectionReason::Expired,
        );
    }

    #[tokio::test]
    async fn test_foreign_signature_is_rejected() {
        let foreign = Authenticator::new(b"some_other_secret_at_least_32_bytes!!");
        let mut repository = MockTestUserRepository::new();
        repository.expect_find_by_id().times(0);

        let resolver = IdentityResolver::new(authenticator(), Arc::new(repository));
        let token = token_for(&foreign, &UserId::new().to_string(), Duration::minutes(5));

        expect_reason(
            resolver.resolve(&token).await,
            RejectionReason::InvalidSignature,
        );
    }

    #[tokio::test]
    async fn test_storage_fault_is_not_a_rejection() {
        let authenticator = authenticator();
        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("connection refused".to_string())));

        let resolver = IdentityResolver::new(authenticator.clone(), Arc::new(repository));
        let token = token_for(&authenticator, &UserId::new().to_string(), Duration::minutes(5));

        let result = resolver.resolve(&token).await;
        assert!(matches!(result, Err(AuthError::Unavailable(_))));
    }
}
