//! HTTP client for the RocketShoes catalog API.
//!
//! Serves both collaborators from one JSON API:
//! - `GET {base}/products/{id}` - product display record
//! - `GET {base}/stock/{id}` - `{ "id": .., "amount": .. }`
//!
//! Product records are cached with `moka`. Stock is always fetched fresh
//! since every stock check must reflect the inventory at commit time.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use rocketshoes_core::{Product, ProductId, StockRecord};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::collaborators::{LookupError, ProductCatalog, StockService};
use crate::config::CartConfig;

const MAX_CACHED_PRODUCTS: u64 = 1000;

/// Client for the catalog and stock endpoints.
///
/// Cheaply cloneable; clones share the HTTP connection pool and the product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<ProductId, Product>,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// `catalog_ttl` bounds how long a product record is served from cache.
    #[must_use]
    pub fn new(base_url: Url, catalog_ttl: Duration) -> Self {
        let products = Cache::builder()
            .max_capacity(MAX_CACHED_PRODUCTS)
            .time_to_live(catalog_ttl)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: with_trailing_slash(base_url),
                products,
            }),
        }
    }

    /// Create a client from loaded configuration.
    #[must_use]
    pub fn from_config(config: &CartConfig) -> Self {
        Self::new(config.api_url.clone(), config.catalog_cache_ttl)
    }

    /// Root URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, resource: &str, product_id: ProductId) -> Result<Url, LookupError> {
        Ok(self
            .inner
            .base_url
            .join(&format!("{resource}/{product_id}"))?)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T, LookupError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            return Err(LookupError::Unavailable(format!(
                "{status} from {}",
                url.path()
            )));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            debug!(body = %body, "Undecodable response body");
            LookupError::Parse(e)
        })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

impl StockService for ApiClient {
    #[instrument(skip(self))]
    async fn get_stock(&self, product_id: ProductId) -> Result<StockRecord, LookupError> {
        let url = self.endpoint("stock", product_id)?;
        let stock: StockRecord = self.fetch(url).await?;
        debug!(available = stock.amount, "Fetched stock");
        Ok(stock)
    }
}

impl ProductCatalog for ApiClient {
    #[instrument(skip(self))]
    async fn get_product(&self, product_id: ProductId) -> Result<Product, LookupError> {
        if let Some(product) = self.inner.products.get(&product_id).await {
            debug!("Product cache hit");
            return Ok(product);
        }

        let url = self.endpoint("products", product_id)?;
        let product: Product = self.fetch(url).await?;
        self.inner
            .products
            .insert(product_id, product.clone())
            .await;
        debug!(title = %product.title, "Fetched product");
        Ok(product)
    }
}
