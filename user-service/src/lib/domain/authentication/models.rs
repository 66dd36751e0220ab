use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserName;

/// Identity of the caller, rebuilt from storage on every request.
///
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub id: UserId,
    pub name: UserName,
    pub email: EmailAddress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for VerifiedIdentity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Why a credential was refused.
///
/// Kept for logs only; callers see a single unauthenticated outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// Missing or garbled header, token, or subject claim
    MalformedCredential,
    InvalidSignature,
    Expired,
    /// Subject or email does not exist in storage
    UnknownSubject,
    PasswordMismatch,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::MalformedCredential => "malformed_credential",
            RejectionReason::InvalidSignature => "invalid_signature",
            RejectionReason::Expired => "expired",
            RejectionReason::UnknownSubject => "unknown_subject",
            RejectionReason::PasswordMismatch => "password_mismatch",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<auth::JwtError> for RejectionReason {
    fn from(err: auth::JwtError) -> Self {
        match err {
            auth::JwtError::InvalidSignature => RejectionReason::InvalidSignature,
            auth::JwtError::TokenExpired => RejectionReason::Expired,
            auth::JwtError::Malformed(_) | auth::JwtError::EncodingFailed(_) => {
                RejectionReason::MalformedCredential
            }
        }
    }
}

/// Login attempt with raw credentials.
#[derive(Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Access token handed out after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub identity: VerifiedIdentity,
}

/// Authentication settings fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSettings {
    /// Lifetime of issued access tokens
    pub token_ttl: Duration,
}

impl AuthSettings {
    pub fn new(token_ttl: Duration) -> Self {
        Self { token_ttl }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_errors_map_to_reasons() {
        assert_eq!(
            RejectionReason::from(auth::JwtError::InvalidSignature),
            RejectionReason::InvalidSignature
        );
        assert_eq!(
            RejectionReason::from(auth::JwtError::TokenExpired),
            RejectionReason::Expired
        );
        assert_eq!(
            RejectionReason::from(auth::JwtError::Malformed("bad".to_string())),
            RejectionReason::MalformedCredential
        );
    }

    #[test]
    fn test_login_command_debug_hides_password() {
        let command = LoginCommand::new("john@example.com".to_string(), "hunter22".to_string());
        let debug = format!("{:?}", command);

        assert!(debug.contains("john@example.com"));
        assert!(!debug.contains("hunter22"));
    }
}
