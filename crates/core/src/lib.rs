//! RocketShoes Core - Shared types library.
//!
//! This crate provides the types used across all RocketShoes components:
//! - `cart` - Cart store, collaborators and storage backends
//! - `cli` - Command-line front end for the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, catalog records and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
