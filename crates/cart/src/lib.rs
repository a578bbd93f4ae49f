//! RocketShoes Cart - stock-checked shopping cart with durable snapshots.
//!
//! # Architecture
//!
//! [`CartStore`] owns the cart. Each command validates against a
//! [`StockService`], fetches new lines from a [`ProductCatalog`], and commits
//! by writing the whole cart to a [`PersistentStore`] before publishing it to
//! readers. Collaborators are passed in at construction; there is no global
//! cart.
//!
//! # Modules
//!
//! - [`store`] - `CartStore` and command outcomes
//! - [`collaborators`] - stock and catalog traits
//! - [`storage`] - persistence trait plus memory and file backends
//! - [`api`] - HTTP implementation of both collaborators
//! - [`notice`] - shopper-facing messages for failed commands
//! - [`config`] - environment configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::{ApiClient, CartConfig, CartStore, FileStore};
//!
//! let config = CartConfig::from_env()?;
//! let api = ApiClient::from_config(&config);
//! let store = CartStore::initialize(
//!     api.clone(),
//!     api,
//!     FileStore::new(&config.cart_file),
//!     &config.storage_key,
//! )?;
//!
//! store.add_product(ProductId::new(1)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod notice;
pub mod storage;
pub mod store;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use api::ApiClient;
pub use collaborators::{LookupError, ProductCatalog, StockService};
pub use config::{CartConfig, ConfigError};
pub use error::CartError;
pub use notice::{CartOperation, Notice, NoticeLevel};
pub use storage::{DEFAULT_CART_KEY, FileStore, MemoryStore, PersistentStore, StorageError};
pub use store::{CartStore, IgnoreReason, Outcome};
