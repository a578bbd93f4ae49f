//! The ordered, id-unique list of products in a shopping cart.
//!
//! `Cart` only exposes mutators that keep its invariants: at most one line
//! per product id, and every line holding at least one unit. Snapshots read
//! back from storage go through [`Cart::parse`], which enforces the same rules.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::{CurrencyCode, Price};
use super::product::Product;

/// Reasons a cart (or a change to one) is rejected.
#[derive(Debug, Error)]
pub enum CartShapeError {
    /// Snapshot text is not a JSON array of products.
    #[error("Malformed cart snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The same product id appears more than once.
    #[error("Duplicate product {0} in cart")]
    DuplicateProduct(ProductId),

    /// A line holds zero units.
    #[error("Product {id} has invalid amount {amount}")]
    InvalidAmount { id: ProductId, amount: u32 },

    /// The product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    UnknownProduct(ProductId),
}

/// Shopping cart contents, in insertion order.
///
/// Serializes as a bare JSON array of products. Deserializing validates the
/// same invariants as [`Cart::try_from`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Cart(Vec<Product>);

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse and validate a serialized snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CartShapeError` if the text is not a product array, or if the
    /// products break the uniqueness or amount rules.
    pub fn parse(snapshot: &str) -> Result<Self, CartShapeError> {
        let products: Vec<Product> = serde_json::from_str(snapshot)?;
        Self::try_from(products)
    }

    /// Serialize the cart as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the line for `id`, if present.
    #[must_use]
    pub fn position(&self, id: ProductId) -> Option<usize> {
        self.0.iter().position(|product| product.id == id)
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.0.iter().find(|product| product.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Append a new line at the end of the cart.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateProduct` if the product already has a line, or
    /// `InvalidAmount` if the product carries zero units.
    pub fn append(&mut self, product: Product) -> Result<(), CartShapeError> {
        if self.contains(product.id) {
            return Err(CartShapeError::DuplicateProduct(product.id));
        }
        if product.amount == 0 {
            return Err(CartShapeError::InvalidAmount {
                id: product.id,
                amount: 0,
            });
        }
        self.0.push(product);
        Ok(())
    }

    /// Replace the quantity of an existing line, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for zero, `UnknownProduct` if there is no line.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> Result<(), CartShapeError> {
        if amount == 0 {
            return Err(CartShapeError::InvalidAmount { id, amount });
        }
        let line = self
            .0
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or(CartShapeError::UnknownProduct(id))?;
        line.amount = amount;
        Ok(())
    }

    /// Remove the line for `id`, keeping the order of the others.
    pub fn remove(&mut self, id: ProductId) -> Option<Product> {
        let index = self.position(id)?;
        Some(self.0.remove(index))
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.0.iter().map(|product| u64::from(product.amount)).sum()
    }

    /// Sum of every line total.
    #[must_use]
    pub fn subtotal(&self, currency_code: CurrencyCode) -> Price {
        let amount = self
            .0
            .iter()
            .map(Product::line_total)
            .fold(Decimal::ZERO, |acc, line| acc + line);
        Price::new(amount, currency_code)
    }
}

impl TryFrom<Vec<Product>> for Cart {
    type Error = CartShapeError;

    fn try_from(products: Vec<Product>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CartShapeError::DuplicateProduct(product.id));
            }
            if product.amount == 0 {
                return Err(CartShapeError::InvalidAmount {
                    id: product.id,
                    amount: product.amount,
                });
            }
        }
        Ok(Self(products))
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let products = Vec::<Product>::deserialize(deserializer)?;
        Self::try_from(products).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
