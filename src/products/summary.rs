use rust_decimal::Decimal;
use serde::Serialize;

use super::repo_types::Product;

/// Quantity at or below which a product counts as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value: Decimal,
    pub low_stock_count: usize,
}

/// The stock value does not fit in a `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("inventory total value overflowed")]
pub struct TotalOverflow;

pub fn summarize(products: &[Product]) -> Result<InventorySummary, TotalOverflow> {
    let total_value = products.iter().try_fold(Decimal::ZERO, |acc, p| {
        p.price
            .checked_mul(Decimal::from(p.quantity))
            .and_then(|line| acc.checked_add(line))
            .ok_or(TotalOverflow)
    })?;
    let low_stock_count = products
        .iter()
        .filter(|p| p.quantity <= LOW_STOCK_THRESHOLD)
        .count();
    Ok(InventorySummary {
        count: products.len(),
        total_value,
        low_stock_count,
    })
}
