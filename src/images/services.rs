use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{error::ApiError, storage::ImageStore};

/// Largest accepted image upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Lifetime of presigned download links.
pub const PRESIGN_TTL: Duration = Duration::from_secs(10 * 60);

/// An image received in a multipart request, not yet stored.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub content_type: String,
    pub body: Bytes,
}

/// Where an accepted image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    /// Path clients use to fetch the image, `/` + key.
    pub stored_path: String,
}

impl StoredFile {
    /// Recovers the object behind a product's `imageUrl`, if it is one of
    /// ours. Foreign URLs yield `None`.
    pub fn from_stored_path(path: &str) -> Option<Self> {
        let name = path.strip_prefix("/uploads/")?;
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return None;
        }
        Some(Self {
            key: format!("uploads/{}", name),
            stored_path: path.to_string(),
        })
    }
}

pub fn check_content_type(content_type: &str) -> Result<(), ApiError> {
    if content_type.starts_with("image/") {
        Ok(())
    } else {
        Err(ApiError::invalid("Not an image! Please upload only images."))
    }
}

pub fn too_large() -> ApiError {
    ApiError::invalid_with(
        "File too large",
        format!("images are limited to {} bytes", MAX_IMAGE_BYTES),
    )
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

/// Keeps the client's file name usable as an object key segment.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

pub fn object_key(img: &UploadedImage, at: OffsetDateTime) -> String {
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    let name = img
        .file_name
        .as_deref()
        .map(sanitize_file_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("image.{}", ext_from_mime(&img.content_type).unwrap_or("bin")));
    format!("uploads/{}-{}", millis, name)
}

/// Validates and uploads the image, returning its stored path.
pub async fn store_image(
    storage: &dyn ImageStore,
    img: UploadedImage,
) -> Result<StoredFile, ApiError> {
    check_content_type(&img.content_type)?;
    if img.body.len() > MAX_IMAGE_BYTES {
        return Err(too_large());
    }

    let key = object_key(&img, OffsetDateTime::now_utc());
    storage
        .put_object(&key, img.body, &img.content_type)
        .await
        .with_context(|| format!("put_object {}", key))
        .map_err(ApiError::StoreFailure)?;
    info!(%key, "image stored");

    Ok(StoredFile {
        stored_path: format!("/{}", key),
        key,
    })
}

/// Best-effort removal of an image no product refers to.
pub async fn discard(storage: &dyn ImageStore, file: &StoredFile) {
    if let Err(e) = storage.delete_object(&file.key).await {
        warn!(error = %e, key = %file.key, "failed to remove orphaned image");
    }
}

pub async fn presign(storage: &dyn ImageStore, key: &str) -> anyhow::Result<String> {
    storage
        .presign_get(key, PRESIGN_TTL)
        .await
        .with_context(|| format!("presign url for key {}", key))
}
