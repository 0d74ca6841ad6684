//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Product grid
//! GET  /health                 - Health check
//!
//! # Cart
//! GET  /cart                   - Cart page
//! GET  /cart/items             - Cart items fragment
//! GET  /cart/count             - Cart count badge (fragment)
//! GET  /cart/summary           - Cart lines and totals as JSON
//! POST /cart/add               - Add one unit (product_id)
//! POST /cart/remove            - Remove a line (product_id)
//! POST /cart/increment         - One more unit on a line (product_id)
//! POST /cart/decrement         - One less unit on a line (product_id)
//! POST /cart/update            - Set a line's quantity (product_id, quantity)
//!
//! # Checkout
//! POST /checkout               - Purchase and empty the cart
//! ```
//!
//! Mutations answer fragment requests (`HX-Request: true`) with the refreshed
//! fragment and an `HX-Trigger: cart-updated` header, and plain form posts with
//! a `303 See Other` back to the page the form lives on.

pub mod cart;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", get(cart::items))
        .route("/count", get(cart::count))
        .route("/summary", get(cart::summary))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/update", post(cart::update))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
}
