//! Session-related types.
//!
//! The visitor's cart is the only thing kept in the session.

/// Session keys.
pub mod keys {
    /// Key for storing the visitor's cart lines.
    pub const CART: &str = "cart";
}
