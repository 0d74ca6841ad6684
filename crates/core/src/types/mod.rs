//! Core types for TechMart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod quantity;

pub use id::*;
pub use price::{MAX_PRICE, Price, PriceError, round_money};
pub use quantity::Quantity;
