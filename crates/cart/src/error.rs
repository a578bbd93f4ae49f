//! Errors returned by cart commands.

use rocketshoes_core::{CartShapeError, ProductId};
use thiserror::Error;

use crate::collaborators::LookupError;
use crate::storage::StorageError;

/// Reasons a cart command did not commit.
///
/// Every variant leaves both the in-memory cart and the persisted snapshot
/// exactly as they were before the command started.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity exceeds available stock.
    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    StockExceeded {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },

    /// Product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    NotFound(ProductId),

    /// Stock or catalog lookup failed.
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Reading or writing the snapshot failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Mutation would break the cart's invariants.
    #[error("Invalid cart: {0}")]
    Shape(#[from] CartShapeError),
}

impl CartError {
    /// Whether the failure came from an external collaborator rather than
    /// from the cart's own rules.
    #[must_use]
    pub const fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::Lookup(_) | Self::Storage(_) | Self::Serialize(_) | Self::Shape(_)
        )
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        let err = CartError::StockExceeded {
            product_id: ProductId::new(1),
            requested: 2,
            available: 1,
        };
        assert_eq!(err.to_string(), "Requested 2 of product 1, only 1 in stock");

        let err = CartError::NotFound(ProductId::new(7));
        assert_eq!(err.to_string(), "Product 7 is not in the cart");
    }

    #[test]
    fn test_collaborator_failure_classification() {
        assert!(
            CartError::Lookup(LookupError::NotFound("stock/1".to_string()))
                .is_collaborator_failure()
        );
        assert!(
            CartError::Storage(StorageError::Unavailable("disk full".to_string()))
                .is_collaborator_failure()
        );
        assert!(!CartError::NotFound(ProductId::new(1)).is_collaborator_failure());
        assert!(
            !CartError::StockExceeded {
                product_id: ProductId::new(1),
                requested: 2,
                available: 1,
            }
            .is_collaborator_failure()
        );
    }
}
