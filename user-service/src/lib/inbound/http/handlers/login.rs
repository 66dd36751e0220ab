use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::authentication::errors::AuthError;
use crate::domain::authentication::models::LoginCommand;
use crate::domain::authentication::models::RejectionReason;
use crate::domain::authentication::ports::AuthenticationPort;
use crate::inbound::http::router::AppState;

/// Exchange email and password for a bearer token.
///
/// An unknown email, a wrong password and an unreadable body all produce the
/// same 401 response.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!(error = %e, "Unreadable login payload");
        AuthError::rejected(RejectionReason::MalformedCredential)
    })?;

    let issued = state
        .authenticator
        .login(LoginCommand::new(body.email, body.password))
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData {
            user: (&issued.identity).into(),
            access_token: issued.access_token,
            token_type: issued.token_type.to_string(),
        },
    ))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub user: UserData,
    pub access_token: String,
    pub token_type: String,
}
