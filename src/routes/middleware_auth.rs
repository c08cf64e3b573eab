use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::auth::model::Identity;
use crate::error::{AppError, AuthError};
use crate::state::AppState;

/// The identity `require_auth` resolved for this request.
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or(AppError::Unauthenticated(AuthError::MissingToken))
    }
}

/// Guard for every task route: turns the `Authorization` header into an
/// [`Identity`] or stops the request with a 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let identity = state.verifier.authenticate(authorization)?;
    tracing::debug!(account_id = identity.account_id, "request authenticated");

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
