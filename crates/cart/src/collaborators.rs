//! Stock and catalog lookups the cart store depends on.
//!
//! Both are leaf services owned by the product inventory. [`crate::api::ApiClient`]
//! implements them over HTTP; tests use the fakes in `testing`.

use std::future::Future;
use std::sync::Arc;

use rocketshoes_core::{Product, ProductId, StockRecord};
use thiserror::Error;

/// Errors that can occur when looking up stock or catalog records.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Product or stock record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Service answered with a non-success status.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Response decoded but does not describe the requested product.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Source of purchasable quantities.
pub trait StockService: Send + Sync {
    /// Available stock for `product_id` at query time.
    fn get_stock(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<StockRecord, LookupError>> + Send;
}

/// Source of product display records.
pub trait ProductCatalog: Send + Sync {
    /// The catalog record for `product_id`. Its `amount` is ignored by callers.
    fn get_product(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Product, LookupError>> + Send;
}

impl<T: StockService> StockService for Arc<T> {
    fn get_stock(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<StockRecord, LookupError>> + Send {
        (**self).get_stock(product_id)
    }
}

impl<T: ProductCatalog> ProductCatalog for Arc<T> {
    fn get_product(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Product, LookupError>> + Send {
        (**self).get_product(product_id)
    }
}
