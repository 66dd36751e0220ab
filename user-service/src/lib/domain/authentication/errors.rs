use thiserror::Error;

use crate::domain::authentication::models::RejectionReason;
use crate::user::errors::UserError;

/// Outcome of a failed authentication attempt.
///
/// Every rejection renders the same message. Storage faults are kept apart
/// so a legitimate caller is not told their credentials are wrong when the
/// database is unreachable.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Could not validate credentials")]
    Unauthenticated(RejectionReason),

    #[error("Authentication temporarily unavailable: {0}")]
    Unavailable(String),

    #[error("Authentication failed: {0}")]
    Internal(String),
}

impl AuthError {
    /// Build a rejection, logging the concrete reason.
    pub fn rejected(reason: RejectionReason) -> Self {
        tracing::warn!(reason = %reason, "Authentication rejected");
        AuthError::Unauthenticated(reason)
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, AuthError::Unauthenticated(_))
    }
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DatabaseError(msg) => {
                tracing::error!(error = %msg, "User lookup failed during authentication");
                AuthError::Unavailable(msg)
            }
            other => {
                tracing::error!(error = %other, "Unexpected user lookup failure");
                AuthError::Internal(other.to_string())
            }
        }
    }
}
