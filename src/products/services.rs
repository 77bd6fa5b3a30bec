use tracing::{info, warn};
use uuid::Uuid;

use super::{
    extract::ProductPayload,
    query::{self, ListParams},
    repo::ProductRepo,
    repo_types::Product,
    summary::{summarize, InventorySummary},
};
use crate::{
    error::ApiError,
    images::services::{discard, store_image, StoredFile},
    storage::ImageStore,
};

fn not_found() -> ApiError {
    ApiError::NotFound("Product")
}

/// Ids that are not UUIDs cannot name a stored product.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| not_found())
}

pub async fn list(
    repo: &dyn ProductRepo,
    params: &ListParams,
) -> Result<(Vec<Product>, InventorySummary), ApiError> {
    let spec = query::build(params);
    let products = repo.find(&spec).await?;
    let summary = summarize(&products).map_err(|e| ApiError::StoreFailure(e.into()))?;
    Ok((products, summary))
}

pub async fn get(repo: &dyn ProductRepo, id: Uuid) -> Result<Product, ApiError> {
    repo.find_by_id(id).await?.ok_or_else(not_found)
}

pub async fn create(
    repo: &dyn ProductRepo,
    storage: &dyn ImageStore,
    payload: ProductPayload,
) -> Result<Product, ApiError> {
    let ProductPayload { mut input, image } = payload;
    let stored = match image {
        Some(img) => Some(store_image(storage, img).await?),
        None => None,
    };
    if let Some(file) = &stored {
        input.image_url = Some(file.stored_path.clone());
    }

    match repo.create(input).await {
        Ok(product) => {
            info!(product_id = %product.id, "product created");
            Ok(product)
        }
        Err(e) => {
            if let Some(file) = &stored {
                discard(storage, file).await;
            }
            Err(e.into())
        }
    }
}

pub async fn update(
    repo: &dyn ProductRepo,
    storage: &dyn ImageStore,
    id: Uuid,
    payload: ProductPayload,
) -> Result<Product, ApiError> {
    let previous = repo.find_by_id(id).await?.ok_or_else(not_found)?;
    let ProductPayload { mut input, image } = payload;
    let stored = match image {
        Some(img) => Some(store_image(storage, img).await?),
        None => None,
    };
    if let Some(file) = &stored {
        input.image_url = Some(file.stored_path.clone());
    }

    let err = match repo.update_by_id(id, input).await {
        Ok(Some(product)) => {
            info!(product_id = %product.id, "product updated");
            if product.image_url != previous.image_url {
                release_image(storage, &previous).await;
            }
            return Ok(product);
        }
        Ok(None) => not_found(),
        Err(e) => e.into(),
    };
    if let Some(file) = &stored {
        discard(storage, file).await;
    }
    Err(err)
}

pub async fn delete(
    repo: &dyn ProductRepo,
    storage: &dyn ImageStore,
    id: Uuid,
) -> Result<(), ApiError> {
    let Some(product) = repo.find_by_id(id).await? else {
        return Err(not_found());
    };
    if !repo.delete_by_id(id).await? {
        // Removed by a concurrent request in between.
        warn!(product_id = %id, "product vanished before delete");
        return Err(not_found());
    }
    info!(product_id = %id, "product deleted");
    release_image(storage, &product).await;
    Ok(())
}

/// Drops the uploaded image a product no longer points at.
async fn release_image(storage: &dyn ImageStore, product: &Product) {
    if let Some(file) = product
        .image_url
        .as_deref()
        .and_then(StoredFile::from_stored_path)
    {
        discard(storage, &file).await;
    }
}
