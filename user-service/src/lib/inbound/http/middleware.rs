use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::authentication::models::VerifiedIdentity;
use crate::domain::authentication::ports::AuthenticationPort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type holding the verified caller in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub VerifiedIdentity);

/// Middleware that resolves the bearer token and adds the caller to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    // A header that is not valid UTF-8 is treated as absent
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let identity = state
        .authenticator
        .authenticate(authorization)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    req.extensions_mut().insert(AuthenticatedUser(identity));

    Ok(next.run(req).await)
}
