//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - command protocol against in-memory collaborators
//! - `cart_properties` - generated command sequences checked against the invariants
//! - `api_client` - HTTP collaborators and file storage end to end
//!
//! This library holds the fixtures the test files share.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_cart::testing::{FakeInventory, sneaker};
use rocketshoes_cart::{CartStore, DEFAULT_CART_KEY, MemoryStore, PersistentStore};
use rocketshoes_core::{Cart, Product, ProductId, StockRecord};

/// Store wired to in-memory collaborators.
pub type TestStore<P = MemoryStore> = CartStore<FakeInventory, FakeInventory, P>;

/// A cart line for `id` holding `amount` units.
#[must_use]
pub fn line(id: i64, amount: u32) -> Product {
    Product {
        amount,
        ..sneaker(id)
    }
}

/// Storage already holding a snapshot of `lines`.
#[must_use]
pub fn seeded_storage(lines: Vec<Product>) -> MemoryStore {
    let cart = Cart::try_from(lines).unwrap();
    MemoryStore::with_entry(DEFAULT_CART_KEY, &cart.to_json().unwrap())
}

/// Build a store over `storage` backed by `inventory`.
#[must_use]
pub fn open_store<P: PersistentStore>(inventory: &FakeInventory, storage: P) -> TestStore<P> {
    CartStore::initialize(inventory.clone(), inventory.clone(), storage, DEFAULT_CART_KEY).unwrap()
}

/// The raw snapshot text currently persisted, if any.
#[must_use]
pub fn persisted_text<P: PersistentStore>(storage: &P) -> Option<String> {
    storage.get(DEFAULT_CART_KEY).unwrap()
}

/// The persisted snapshot, parsed. Missing snapshots read as an empty cart.
#[must_use]
pub fn persisted_cart<P: PersistentStore>(storage: &P) -> Cart {
    persisted_text(storage).map_or_else(Cart::new, |text| Cart::parse(&text).unwrap())
}

/// Product ids in cart order.
#[must_use]
pub fn ids(cart: &Cart) -> Vec<i64> {
    cart.iter().map(|p| p.id.as_i64()).collect()
}

// =============================================================================
// Catalog API fixture
// =============================================================================

/// Products and stock served by [`spawn_catalog_api`], plus request counters.
#[derive(Clone, Default)]
pub struct CatalogApi {
    products: Arc<HashMap<i64, Product>>,
    stock: Arc<HashMap<i64, u32>>,
    product_hits: Arc<AtomicUsize>,
    stock_hits: Arc<AtomicUsize>,
}

impl CatalogApi {
    #[must_use]
    pub fn new(entries: &[(Product, u32)]) -> Self {
        let products = entries
            .iter()
            .map(|(product, _)| (product.id.as_i64(), product.clone()))
            .collect();
        let stock = entries
            .iter()
            .map(|(product, amount)| (product.id.as_i64(), *amount))
            .collect();
        Self {
            products: Arc::new(products),
            stock: Arc::new(stock),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.product_hits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.stock_hits.load(Ordering::SeqCst)
    }
}

// Product 500 always answers with a server error
const BROKEN_PRODUCT: i64 = 500;

async fn product_handler(State(api): State<CatalogApi>, Path(id): Path<i64>) -> Response {
    api.product_hits.fetch_add(1, Ordering::SeqCst);
    if id == BROKEN_PRODUCT {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    api.products.get(&id).map_or_else(
        || StatusCode::NOT_FOUND.into_response(),
        |product| {
            Json(serde_json::json!({
                "id": product.id,
                "title": product.title,
                "price": product.price,
                "image": product.image,
            }))
            .into_response()
        },
    )
}

async fn stock_handler(State(api): State<CatalogApi>, Path(id): Path<i64>) -> Response {
    api.stock_hits.fetch_add(1, Ordering::SeqCst);
    if id == BROKEN_PRODUCT {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }
    api.stock.get(&id).map_or_else(
        || StatusCode::NOT_FOUND.into_response(),
        |&amount| {
            Json(StockRecord {
                id: ProductId::new(id),
                amount,
            })
            .into_response()
        },
    )
}

/// Serve `api` on an ephemeral local port and return its base URL.
pub async fn spawn_catalog_api(api: CatalogApi) -> url::Url {
    let app = Router::new()
        .route("/products/{id}", get(product_handler))
        .route("/stock/{id}", get(stock_handler))
        .with_state(api);

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    url::Url::parse(&format!("http://{addr}")).unwrap()
}

/// The id of a product whose endpoints always misbehave.
#[must_use]
pub const fn broken_product() -> ProductId {
    ProductId::new(BROKEN_PRODUCT)
}
