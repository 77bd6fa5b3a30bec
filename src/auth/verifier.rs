use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::{error, warn};

use super::{jwt::JwtKeys, repo::UserRepo, repo_types::Identity};
use crate::error::ApiError;

/// Returns the token of a `Bearer <token>` Authorization header.
/// The scheme is matched case-sensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Turns a bearer credential into the caller's [`Identity`].
pub struct TokenVerifier {
    keys: JwtKeys,
    users: Arc<dyn UserRepo>,
}

impl TokenVerifier {
    pub fn new(keys: JwtKeys, users: Arc<dyn UserRepo>) -> Self {
        Self { keys, users }
    }

    /// Every failure is reported as [`ApiError::Unauthenticated`]; the
    /// reason only goes to the log.
    pub async fn verify(&self, headers: &HeaderMap) -> Result<Identity, ApiError> {
        let Some(token) = bearer_token(headers) else {
            warn!("missing bearer token");
            return Err(ApiError::Unauthenticated);
        };

        let claims = self.keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Unauthenticated
        })?;

        match self.users.find_by_id(claims.sub).await {
            Ok(Some(user)) => Ok(Identity::from(user)),
            Ok(None) => {
                warn!(user_id = %claims.sub, "token subject no longer exists");
                Err(ApiError::Unauthenticated)
            }
            Err(e) => {
                error!(error = %e, user_id = %claims.sub, "user lookup failed");
                Err(ApiError::Unauthenticated)
            }
        }
    }
}
