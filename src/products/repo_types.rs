use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::error::StoreError;

/// Product row as stored and as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: i32,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Client-supplied product fields, used for both create and partial update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// A fully validated product to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub category: String,
    pub image_url: Option<String>,
}

/// A validated partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl ProductInput {
    pub fn into_new(self) -> Result<NewProduct, StoreError> {
        let name = required_text("name", self.name)?;
        let category = required_text("category", self.category)?;
        let price = check_price(self.price.ok_or_else(|| missing("price"))?)?;
        let quantity = check_quantity(self.quantity.ok_or_else(|| missing("quantity"))?)?;
        Ok(NewProduct {
            name,
            description: self.description.unwrap_or_default(),
            price,
            quantity,
            category,
            image_url: self.image_url,
        })
    }

    pub fn into_patch(self) -> Result<ProductPatch, StoreError> {
        Ok(ProductPatch {
            name: self.name.map(|v| required_text("name", Some(v))).transpose()?,
            description: self.description,
            price: self.price.map(check_price).transpose()?,
            quantity: self.quantity.map(check_quantity).transpose()?,
            category: self
                .category
                .map(|v| required_text("category", Some(v)))
                .transpose()?,
            image_url: self.image_url,
        })
    }
}

fn missing(field: &str) -> StoreError {
    StoreError::Invalid(format!("{field} is required"))
}

fn required_text(field: &str, value: Option<String>) -> Result<String, StoreError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(missing(field)),
    }
}

/// Fractional digits kept for a price; matches `NUMERIC(14, 2)`.
pub const PRICE_SCALE: u32 = 2;

/// Largest storable price: 999 999 999 999.99.
pub const MAX_PRICE: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, PRICE_SCALE);

fn check_price(price: Decimal) -> Result<Decimal, StoreError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(StoreError::Invalid("price must not be negative".into()));
    }
    // Same rounding Postgres applies when storing into the column.
    let price = price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if price > MAX_PRICE {
        return Err(StoreError::Invalid(format!("price must not exceed {MAX_PRICE}")));
    }
    Ok(price)
}

fn check_quantity(quantity: i64) -> Result<i32, StoreError> {
    if quantity < 0 {
        return Err(StoreError::Invalid("quantity must not be negative".into()));
    }
    i32::try_from(quantity).map_err(|_| StoreError::Invalid("quantity is too large".into()))
}

/// Product attributes that can be filtered or sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Description,
    Price,
    Quantity,
    Category,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

impl ProductField {
    /// Accepts the JSON (camelCase) name or the column name.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "name" => Self::Name,
            "description" => Self::Description,
            "price" => Self::Price,
            "quantity" => Self::Quantity,
            "category" => Self::Category,
            "imageUrl" | "image_url" => Self::ImageUrl,
            "createdAt" | "created_at" => Self::CreatedAt,
            "updatedAt" | "updated_at" => Self::UpdatedAt,
            _ => return None,
        })
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Price => "price",
            Self::Quantity => "quantity",
            Self::Category => "category",
            Self::ImageUrl => "image_url",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}
