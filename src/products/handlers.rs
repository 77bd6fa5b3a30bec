use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use tracing::instrument;

use super::{
    dto::{DataResponse, Empty, ProductListResponse},
    extract::ProductPayload,
    query::ListParams,
    repo_types::Product,
    services,
};
use crate::{
    auth::{
        gate::{authenticate, require_admin},
        Identity,
    },
    error::ApiError,
    images::services::MAX_IMAGE_BYTES,
    state::AppState,
};

/// Room for the image plus the other form fields.
const WRITE_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

// --- public routers ---

pub fn read_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
}

pub fn write_routes(state: &AppState) -> Router<AppState> {
    // The last route_layer runs first: authenticate, then require_admin.
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
        .layer(DefaultBodyLimit::max(WRITE_BODY_LIMIT))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
}

// --- handlers ---

#[instrument(skip(state, identity), fields(user_id = %identity.id))]
pub async fn list_products(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let (data, summary) = services::list(state.products.as_ref(), &params).await?;
    Ok(Json(ProductListResponse {
        success: true,
        summary,
        data,
    }))
}

#[instrument(skip(state, identity), fields(user_id = %identity.id))]
pub async fn get_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Product>>, ApiError> {
    let id = services::parse_id(&id)?;
    let product = services::get(state.products.as_ref(), id).await?;
    Ok(Json(DataResponse::ok(product)))
}

#[instrument(skip(state, identity, payload), fields(user_id = %identity.id))]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: ProductPayload,
) -> Result<(StatusCode, Json<DataResponse<Product>>), ApiError> {
    let product =
        services::create(state.products.as_ref(), state.storage.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::ok(product))))
}

#[instrument(skip(state, identity, payload), fields(user_id = %identity.id))]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    payload: ProductPayload,
) -> Result<Json<DataResponse<Product>>, ApiError> {
    let id = services::parse_id(&id)?;
    let product =
        services::update(state.products.as_ref(), state.storage.as_ref(), id, payload).await?;
    Ok(Json(DataResponse::ok(product)))
}

#[instrument(skip(state, identity), fields(user_id = %identity.id))]
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Empty>>, ApiError> {
    let id = services::parse_id(&id)?;
    services::delete(state.products.as_ref(), state.storage.as_ref(), id).await?;
    Ok(Json(DataResponse::ok(Empty {})))
}
