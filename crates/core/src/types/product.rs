//! Catalog product and stock records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A purchasable product, as served by the catalog and stored in the cart.
///
/// The catalog leaves `amount` out; it only carries meaning once the product
/// is a cart line, where it is always at least 1.
///
/// `price` is written as a JSON number and read from either a number or a
/// decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub image: String,
    /// Quantity of this product in the cart.
    #[serde(default)]
    pub amount: u32,
}

impl Product {
    /// Price multiplied by the quantity in the cart.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.amount)
    }
}

/// Available quantity of a product at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: ProductId,
    pub amount: u32,
}

impl StockRecord {
    /// Whether `requested` units can be purchased.
    #[must_use]
    pub fn covers(&self, requested: u64) -> bool {
        requested <= u64::from(self.amount)
    }
}
