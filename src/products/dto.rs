use serde::Serialize;

use super::{repo_types::Product, summary::InventorySummary};

/// `GET /products` envelope.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: InventorySummary,
    pub data: Vec<Product>,
}

/// Envelope for single-record responses.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

/// Serializes as `{}`.
#[derive(Debug, Serialize)]
pub struct Empty {}
