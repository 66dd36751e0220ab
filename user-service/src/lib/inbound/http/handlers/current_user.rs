use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::inbound::http::middleware::AuthenticatedUser;

/// Return the caller as resolved by the authentication middleware.
pub async fn current_user(
    Extension(AuthenticatedUser(identity)): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, (&identity).into()))
}
