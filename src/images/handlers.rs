use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tracing::instrument;

use super::services::presign;
use crate::{error::ApiError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/uploads/*key", get(get_image))
}

/// Temporary redirect to a presigned URL for a stored product image.
#[instrument(skip(state))]
pub async fn get_image(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    if key.is_empty() || key.split('/').any(|seg| seg == "..") {
        return Err(ApiError::NotFound("Image"));
    }
    let object_key = format!("uploads/{}", key);
    let url = presign(state.storage.as_ref(), &object_key)
        .await
        .map_err(ApiError::StoreFailure)?;
    Ok(Redirect::temporary(&url).into_response())
}
