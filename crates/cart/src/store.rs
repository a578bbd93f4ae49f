//! The cart store: stock-checked mutations over a persisted cart.
//!
//! # Protocol
//!
//! Every command works on a copy of the last committed cart. It validates the
//! change against the stock service (or fetches a new line from the catalog),
//! applies it to the copy, and commits. A commit writes the serialized cart to
//! storage first and only then publishes it to readers and subscribers, so a
//! failure at any step leaves memory and storage untouched.
//!
//! Commands on one store are serialized: the command lock is held from the
//! first read of the cart until the commit, so concurrent increments of the
//! same product never collapse into one.
//!
//! # Policies
//!
//! - Adding a product that is not yet in the cart inserts it with quantity 1
//!   without asking the stock service.
//! - Removing a product that is not in the cart is an error.
//! - Updating a product that is not in the cart is ignored, as is any
//!   requested quantity of zero or less.

use std::sync::Arc;

use rocketshoes_core::{Cart, ProductId, StockRecord};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

use crate::collaborators::{LookupError, ProductCatalog, StockService};
use crate::error::{CartError, Result};
use crate::storage::PersistentStore;

/// What a successful command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The cart changed; carries the committed snapshot.
    Committed(Cart),
    /// Nothing changed and nothing was persisted.
    Ignored(IgnoreReason),
}

/// Why an update left the cart alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Requested quantity was zero or negative.
    NonPositiveAmount,
    /// Product has no line in the cart.
    NotInCart,
}

impl Outcome {
    /// The committed cart, if the command changed anything.
    #[must_use]
    pub const fn committed(&self) -> Option<&Cart> {
        match self {
            Self::Committed(cart) => Some(cart),
            Self::Ignored(_) => None,
        }
    }
}

/// Shopping cart with stock validation and durable snapshots.
///
/// Cheaply cloneable; clones share the same cart.
pub struct CartStore<S, C, P> {
    inner: Arc<CartStoreInner<S, C, P>>,
}

struct CartStoreInner<S, C, P> {
    stock: S,
    catalog: C,
    storage: P,
    storage_key: String,
    commands: Mutex<()>,
    snapshot: watch::Sender<Cart>,
}

impl<S, C, P> Clone for CartStore<S, C, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, C, P> CartStore<S, C, P>
where
    S: StockService,
    C: ProductCatalog,
    P: PersistentStore,
{
    /// Load the cart persisted under `storage_key` and build a store around it.
    ///
    /// A missing snapshot yields an empty cart. So does a snapshot that fails
    /// validation (unparseable, duplicated ids, zero quantities); it is logged
    /// and left in storage until the next commit overwrites it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the storage backend cannot be read.
    #[instrument(skip(stock, catalog, storage))]
    pub fn initialize(stock: S, catalog: C, storage: P, storage_key: &str) -> Result<Self> {
        let cart = match storage.get(storage_key)? {
            Some(snapshot) => Cart::parse(&snapshot).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding invalid cart snapshot");
                Cart::new()
            }),
            None => Cart::new(),
        };
        debug!(lines = cart.len(), "Cart loaded");

        let (snapshot, _) = watch::channel(cart);
        Ok(Self {
            inner: Arc::new(CartStoreInner {
                stock,
                catalog,
                storage,
                storage_key: storage_key.to_string(),
                commands: Mutex::new(()),
                snapshot,
            }),
        })
    }

    /// The last committed cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.snapshot.borrow().clone()
    }

    /// Receive every committed cart from now on.
    ///
    /// The receiver starts out holding the current cart, marked as seen.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.snapshot.subscribe()
    }

    /// Storage key the cart is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    /// Add one unit of `product_id`.
    ///
    /// A product already in the cart is incremented in place if stock allows.
    /// A new product is fetched from the catalog and appended with quantity 1.
    ///
    /// # Errors
    ///
    /// - `StockExceeded` if the incremented quantity is above available stock
    /// - `Lookup` if the stock service or catalog fails
    /// - `Storage` / `Serialize` if the commit fails
    #[instrument(skip(self))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<Outcome> {
        let _guard = self.inner.commands.lock().await;
        let mut cart = self.cart();

        let current = cart.get(product_id).map(|line| line.amount);
        if let Some(current) = current {
            let requested = u64::from(current) + 1;
            let stock = self.stock_for(product_id).await?;
            let amount = checked_amount(&stock, requested)?;
            cart.set_amount(product_id, amount)?;
        } else {
            let mut product = self.inner.catalog.get_product(product_id).await?;
            if product.id != product_id {
                return Err(LookupError::Malformed(format!(
                    "catalog returned product {} for {product_id}",
                    product.id
                ))
                .into());
            }
            product.amount = 1;
            cart.append(product)?;
        }

        self.commit(cart).map(Outcome::Committed)
    }

    /// Remove the line for `product_id`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the product is not in the cart
    /// - `Storage` / `Serialize` if the commit fails
    #[instrument(skip(self))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<Outcome> {
        let _guard = self.inner.commands.lock().await;
        let mut cart = self.cart();

        if cart.remove(product_id).is_none() {
            debug!("Product not in cart");
            return Err(CartError::NotFound(product_id));
        }

        self.commit(cart).map(Outcome::Committed)
    }

    /// Set the quantity of `product_id` to exactly `amount`.
    ///
    /// Stock is checked before membership, so a stock failure is reported
    /// even for a product that is not in the cart.
    ///
    /// # Errors
    ///
    /// - `StockExceeded` if `amount` is above available stock
    /// - `Lookup` if the stock service fails
    /// - `Storage` / `Serialize` if the commit fails
    #[instrument(skip(self))]
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<Outcome> {
        if amount <= 0 {
            debug!("Ignoring non-positive amount");
            return Ok(Outcome::Ignored(IgnoreReason::NonPositiveAmount));
        }

        let _guard = self.inner.commands.lock().await;
        let stock = self.stock_for(product_id).await?;
        let amount = checked_amount(&stock, amount.unsigned_abs())?;

        let mut cart = self.cart();
        if !cart.contains(product_id) {
            debug!("Ignoring update for product not in cart");
            return Ok(Outcome::Ignored(IgnoreReason::NotInCart));
        }

        cart.set_amount(product_id, amount)?;
        self.commit(cart).map(Outcome::Committed)
    }

    /// Replace the whole cart and persist it.
    ///
    /// Bypasses stock validation; the cart's own invariants still hold because
    /// `Cart` cannot be built without them.
    ///
    /// # Errors
    ///
    /// Returns `Storage` / `Serialize` if the commit fails.
    #[instrument(skip_all, fields(lines = cart.len()))]
    pub async fn set_cart_data(&self, cart: Cart) -> Result<Cart> {
        let _guard = self.inner.commands.lock().await;
        self.commit(cart)
    }

    async fn stock_for(&self, product_id: ProductId) -> Result<StockRecord> {
        let stock = self.inner.stock.get_stock(product_id).await?;
        if stock.id != product_id {
            return Err(LookupError::Malformed(format!(
                "stock service returned product {} for {product_id}",
                stock.id
            ))
            .into());
        }
        debug!(available = stock.amount, "Stock checked");
        Ok(stock)
    }

    /// Persist then publish. Must be called with the command lock held.
    fn commit(&self, cart: Cart) -> Result<Cart> {
        let snapshot = cart.to_json()?;
        self.inner.storage.set(&self.inner.storage_key, &snapshot)?;
        self.inner.snapshot.send_replace(cart.clone());

        info!(
            lines = cart.len(),
            items = cart.item_count(),
            "Cart committed"
        );
        Ok(cart)
    }
}

/// Validate `requested` against `stock`, narrowing it to a line quantity.
fn checked_amount(stock: &StockRecord, requested: u64) -> Result<u32> {
    let exceeded = || CartError::StockExceeded {
        product_id: stock.id,
        requested,
        available: stock.amount,
    };

    if !stock.covers(requested) {
        warn!(
            product_id = %stock.id,
            requested,
            available = stock.amount,
            "Requested quantity exceeds stock"
        );
        return Err(exceeded());
    }
    u32::try_from(requested).map_err(|_| exceeded())
}
