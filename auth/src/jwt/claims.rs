use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Bearer token payload.
///
/// `sub`, `iat` and `exp` are mandatory. `email` and `name` are snapshots
/// taken at issuance and are not refreshed when the underlying record changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Claims {
    /// Create claims for a subject, valid for `ttl` from now.
    pub fn for_subject(subject: impl ToString, ttl: Duration) -> Self {
        Self::issued_at(subject, Utc::now(), ttl)
    }

    /// Create claims for a subject, valid for `ttl` from `now`.
    pub fn issued_at(subject: impl ToString, now: DateTime<Utc>, ttl: Duration) -> Self {
        let issued_at = now.timestamp();

        Self {
            sub: subject.to_string(),
            iat: issued_at,
            exp: issued_at + ttl.num_seconds(),
            email: None,
            name: None,
        }
    }

    /// Attach an email snapshot.
    pub fn with_email(mut self, email: impl ToString) -> Self {
        self.email = Some(email.to_string());
        self
    }

    /// Attach a display name snapshot.
    pub fn with_name(mut self, name: impl ToString) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Check if token is expired.
    ///
    /// A token stops being valid at the exact second of its expiry.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    /// Lifetime the token was issued with, in seconds.
    pub fn lifetime(&self) -> i64 {
        self.exp - self.iat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_subject() {
        let claims = Claims::for_subject("user123", Duration::hours(24));

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.lifetime(), 24 * 60 * 60);
        assert!(claims.email.is_none());
        assert!(claims.name.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = Claims::issued_at("user123", now, Duration::minutes(30))
            .with_email("alice@example.com")
            .with_name("Alice");

        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_001_800);
        assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
        assert_eq!(claims.name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_is_expired() {
        let now = DateTime::<Utc>::from_timestamp(1000, 0).unwrap();
        let claims = Claims::issued_at("user123", now, Duration::seconds(60));

        assert!(!claims.is_expired(1000));
        assert!(!claims.is_expired(1059));
        assert!(claims.is_expired(1060)); // Exactly at expiration
        assert!(claims.is_expired(1061));
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let now = Utc::now();
        let claims = Claims::issued_at("user123", now, Duration::zero());

        assert!(claims.is_expired(now.timestamp()));
    }

    #[test]
    fn test_optional_claims_are_omitted() {
        let claims = Claims::for_subject("user123", Duration::minutes(5));
        let json = serde_json::to_value(&claims).unwrap();

        assert!(json.get("email").is_none());
        assert!(json.get("name").is_none());
        assert_eq!(json["sub"], "user123");
    }
}
