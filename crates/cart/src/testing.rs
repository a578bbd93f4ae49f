//! In-memory collaborators for tests.
//!
//! Enabled for this crate's own tests and, through the `test-util` feature,
//! for downstream integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rocketshoes_core::{Product, ProductId, StockRecord};
use rust_decimal::Decimal;

use crate::collaborators::{LookupError, ProductCatalog, StockService};
use crate::storage::{MemoryStore, PersistentStore, StorageError};

/// A catalog record with deterministic fields and no cart quantity.
#[must_use]
pub fn sneaker(id: i64) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Tênis {id}"),
        price: Decimal::new(9_990 + id * 1_000, 2),
        image: format!("https://cdn.rocketshoes.test/tenis{id}.jpg"),
        amount: 0,
    }
}

/// Stock service and catalog backed by shared maps.
///
/// Clones share state, so a test can keep a handle after giving one to a
/// store. Every lookup yields to the runtime once before answering, which
/// lets concurrently issued commands interleave.
#[derive(Debug, Clone, Default)]
pub struct FakeInventory {
    state: Arc<Mutex<InventoryState>>,
}

#[derive(Debug, Default)]
struct InventoryState {
    catalog: HashMap<ProductId, Product>,
    stock: HashMap<ProductId, u32>,
    stock_queries: usize,
    catalog_queries: usize,
    fail_stock: bool,
    fail_catalog: bool,
}

impl FakeInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `product` in the catalog with `stock` units available.
    #[must_use]
    pub fn with_product(self, product: Product, stock: u32) -> Self {
        self.with_state(|state| {
            state.stock.insert(product.id, stock);
            state.catalog.insert(product.id, product);
        });
        self
    }

    /// Serve `product` when `id` is requested, even if the ids differ.
    #[must_use]
    pub fn with_catalog_entry(self, id: ProductId, product: Product) -> Self {
        self.with_state(|state| {
            state.catalog.insert(id, product);
        });
        self
    }

    pub fn set_stock(&self, id: ProductId, amount: u32) {
        self.with_state(|state| {
            state.stock.insert(id, amount);
        });
    }

    /// Make every stock lookup fail until switched back.
    pub fn fail_stock_lookups(&self, fail: bool) {
        self.with_state(|state| state.fail_stock = fail);
    }

    /// Make every catalog lookup fail until switched back.
    pub fn fail_catalog_lookups(&self, fail: bool) {
        self.with_state(|state| state.fail_catalog = fail);
    }

    #[must_use]
    pub fn stock_queries(&self) -> usize {
        self.with_state(|state| state.stock_queries)
    }

    #[must_use]
    pub fn catalog_queries(&self) -> usize {
        self.with_state(|state| state.catalog_queries)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut InventoryState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

impl StockService for FakeInventory {
    async fn get_stock(&self, product_id: ProductId) -> Result<StockRecord, LookupError> {
        let result = self.with_state(|state| {
            state.stock_queries += 1;
            if state.fail_stock {
                return Err(LookupError::Unavailable("stock service down".to_string()));
            }
            state
                .stock
                .get(&product_id)
                .map(|&amount| StockRecord {
                    id: product_id,
                    amount,
                })
                .ok_or_else(|| LookupError::NotFound(format!("stock/{product_id}")))
        });
        tokio::task::yield_now().await;
        result
    }
}

impl ProductCatalog for FakeInventory {
    async fn get_product(&self, product_id: ProductId) -> Result<Product, LookupError> {
        let result = self.with_state(|state| {
            state.catalog_queries += 1;
            if state.fail_catalog {
                return Err(LookupError::Unavailable("catalog down".to_string()));
            }
            state
                .catalog
                .get(&product_id)
                .cloned()
                .ok_or_else(|| LookupError::NotFound(format!("products/{product_id}")))
        });
        tokio::task::yield_now().await;
        result
    }
}

/// Memory-backed storage whose writes can be made to fail.
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
    entries: MemoryStore,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    #[must_use]
    pub fn new(entries: MemoryStore) -> Self {
        Self {
            entries,
            fail_writes: Arc::default(),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl PersistentStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.entries.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.entries.set(key, value)
    }
}
