use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::{jwt::JwtKeys, repo_types::Identity, verifier::TokenVerifier};
use crate::{error::ApiError, state::AppState};

/// Resolves the caller and stores the [`Identity`] in request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let verifier = TokenVerifier::new(JwtKeys::from_ref(&state), state.users.clone());
    let identity = verifier.verify(req.headers()).await?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Must run after [`authenticate`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    match req.extensions().get::<Identity>() {
        Some(identity) if identity.is_admin => Ok(next.run(req).await),
        Some(identity) => {
            warn!(user_id = %identity.id, "admin access denied");
            Err(ApiError::Forbidden)
        }
        None => Err(ApiError::Forbidden),
    }
}
