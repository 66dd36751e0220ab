use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::VerifiedIdentity;
use crate::domain::user::models::User;
use crate::user::errors::UserError;

pub mod create_user;
pub mod current_user;
pub mod delete_user;
pub mod get_user;
pub mod list_users;
pub mod login;
pub mod update_user;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let mut response =
            (status, Json(ApiResponseBody::new_error(status, message))).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }

        response
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::EmailAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            UserError::EmptyUpdate => ApiError::BadRequest(err.to_string()),
            UserError::InvalidName(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidPassword(_)
            | UserError::InvalidUserId(_) => ApiError::UnprocessableEntity(err.to_string()),
            UserError::Password(_) | UserError::DatabaseError(_) | UserError::Internal(_) => {
                tracing::error!(error = %err, "User operation failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated(_) => ApiError::Unauthorized(err.to_string()),
            AuthError::Unavailable(_) => {
                ApiError::ServiceUnavailable("Service temporarily unavailable".to_string())
            }
            AuthError::Internal(_) => {
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.as_str().to_string(),
            email: user.email.as_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<&VerifiedIdentity> for UserData {
    fn from(identity: &VerifiedIdentity) -> Self {
        Self {
            id: identity.id.to_string(),
            name: identity.name.as_str().to_string(),
            email: identity.email.as_str().to_string(),
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::authentication::models::RejectionReason;

    #[test]
    fn test_unauthorized_carries_challenge_header() {
        let response = ApiError::Unauthorized("nope".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_other_errors_have_no_challenge_header() {
        let response = ApiError::NotFound("missing".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_every_rejection_maps_to_same_error() {
        let reasons = [
            RejectionReason::MalformedCredential,
            RejectionReason::InvalidSignature,
            RejectionReason::Expired,
            RejectionReason::UnknownSubject,
            RejectionReason::PasswordMismatch,
        ];

        let errors: Vec<ApiError> = reasons
            .into_iter()
            .map(|reason| ApiError::from(AuthError::Unauthenticated(reason)))
            .collect();

        for error in &errors {
            assert_eq!(
                *error,
                ApiError::Unauthorized("Could not validate credentials".to_string())
            );
        }
    }

    #[test]
    fn test_auth_storage_fault_is_service_unavailable() {
        let error = ApiError::from(AuthError::Unavailable("pool timed out".to_string()));
        assert!(matches!(error, ApiError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_user_error_status_mapping() {
        assert!(matches!(
            ApiError::from(UserError::EmptyUpdate),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::EmailAlreadyExists("a@b.com".to_string())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::NotFound("id".to_string())),
            ApiError::NotFound(_)
        ));
        assert_eq!(
            ApiError::from(UserError::DatabaseError("secret detail".to_string())),
            ApiError::InternalServerError("Internal server error".to_string())
        );
        assert_eq!(
            ApiError::from(UserError::Internal("task panicked".to_string())),
            ApiError::InternalServerError("Internal server error".to_string())
        );
    }
}
