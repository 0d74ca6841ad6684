//! TechMart Core - Catalog and cart domain library.
//!
//! This crate provides the domain used across all TechMart components:
//! - `storefront` - Public-facing web shop rendering the catalog and cart
//! - `cli` - Command-line tools for inspecting the catalog and replaying cart events
//!
//! # Architecture
//!
//! The core crate contains only types and state transitions - no I/O, no HTTP,
//! no logging. A [`CartManager`] is an explicitly owned value: whoever drives the
//! UI event loop holds it and feeds it events one at a time.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices and quantities
//! - [`catalog`] - The read-only product catalog
//! - [`cart`] - Cart lines, the cart manager and operation outcomes
//! - [`summary`] - Derived totals and the joined view handed to renderers
//! - [`event`] - UI events mapped onto cart manager operations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod event;
pub mod summary;
pub mod types;

pub use cart::{
    AddOutcome, Cart, CartError, CartLine, CartManager, CheckoutOutcome, LineOutcome, Receipt,
};
pub use catalog::{Catalog, CatalogError, Product};
pub use event::{CartEvent, EventOutcome};
pub use summary::{CartSnapshot, CartSummary, LineSummary, SnapshotLine};
pub use types::*;
