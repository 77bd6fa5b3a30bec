use axum::{
    async_trait,
    extract::{multipart::Field, FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use bytes::BytesMut;
use rust_decimal::Decimal;

use super::repo_types::ProductInput;
use crate::{
    error::ApiError,
    images::services::{check_content_type, too_large, UploadedImage, MAX_IMAGE_BYTES},
};

/// Body of a product write: JSON, or a multipart form whose text fields are
/// product fields plus an optional `image` file.
#[derive(Debug)]
pub struct ProductPayload {
    pub input: ProductInput,
    pub image: Option<UploadedImage>,
}

const IMAGE_FIELD: &str = "image";

#[async_trait]
impl<S> FromRequest<S> for ProductPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(input) = Json::<ProductInput>::from_request(req, state)
                .await
                .map_err(|e| ApiError::invalid_with("Invalid product data", e.body_text()))?;
            return Ok(Self { input, image: None });
        }

        let mut mp = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_with("Invalid product data", e.body_text()))?;

        let mut input = ProductInput::default();
        let mut image = None;
        while let Some(field) = mp
            .next_field()
            .await
            .map_err(|e| ApiError::invalid_with("Invalid product data", e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            // Only parts with a filename are files; a bare `image` text part is ignored.
            if field.file_name().is_some() {
                if name != IMAGE_FIELD || image.is_some() {
                    return Err(ApiError::invalid_with("Unexpected field", name));
                }
                image = Some(read_image(field).await?);
                continue;
            }
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::invalid_with("Invalid product data", e.body_text()))?;
            apply_text_field(&mut input, &name, value)?;
        }
        Ok(Self { input, image })
    }
}

/// Streams the file, giving up as soon as it passes the size limit.
async fn read_image(mut field: Field<'_>) -> Result<UploadedImage, ApiError> {
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    check_content_type(&content_type)?;
    let file_name = field.file_name().map(str::to_string);

    let mut buf = BytesMut::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::invalid_with("Invalid product data", e.body_text()))?
    {
        if buf.len() + chunk.len() > MAX_IMAGE_BYTES {
            return Err(too_large());
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(UploadedImage {
        file_name,
        content_type,
        body: buf.freeze(),
    })
}

/// Form values arrive as text; numeric fields are parsed here.
fn apply_text_field(input: &mut ProductInput, name: &str, value: String) -> Result<(), ApiError> {
    match name {
        "name" => input.name = Some(value),
        "description" => input.description = Some(value),
        "category" => input.category = Some(value),
        "imageUrl" => input.image_url = Some(value),
        "price" => {
            let price = value.trim().parse::<Decimal>().map_err(|_| {
                ApiError::invalid_with("Invalid product data", format!("price: not a number: {value}"))
            })?;
            input.price = Some(price);
        }
        "quantity" => {
            let quantity = value.trim().parse::<i64>().map_err(|_| {
                ApiError::invalid_with(
                    "Invalid product data",
                    format!("quantity: not an integer: {value}"),
                )
            })?;
            input.quantity = Some(quantity);
        }
        _ => {}
    }
    Ok(())
}
