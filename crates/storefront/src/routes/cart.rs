//! Cart route handlers.
//!
//! The cart itself lives in the visitor's session. Each request loads it into
//! a [`CartManager`], applies exactly one operation, and writes it back.
//! Mutating requests of one session run one at a time, see
//! [`crate::middleware::session_lock`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use techmart_core::{
    AddOutcome, Cart, CartEvent, CartManager, CartSnapshot, CheckoutOutcome, ProductId,
    SnapshotLine,
};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::session_keys;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&CartSnapshot<'_>> for CartView {
    fn from(snapshot: &CartSnapshot<'_>) -> Self {
        Self {
            items: snapshot.lines.iter().map(CartItemView::from).collect(),
            subtotal: filters::format_money(snapshot.summary.grand_total),
            item_count: snapshot.summary.item_count,
        }
    }
}

impl From<&SnapshotLine<'_>> for CartItemView {
    fn from(line: &SnapshotLine<'_>) -> Self {
        Self {
            product_id: line.product.id.to_string(),
            name: line.product.name.clone(),
            quantity: line.quantity.get(),
            price: filters::format_money(line.product.price.amount()),
            line_price: filters::format_money(line.subtotal),
            image: line.product.image_ref.clone(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the visitor's cart from the session into a manager.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_cart(state: &AppState, session: &Session) -> Result<CartManager> {
    let cart = session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default();

    let mut manager = CartManager::with_cart(state.catalog_handle(), cart);
    manager.subscribe(|snapshot| {
        tracing::debug!(
            lines = snapshot.summary.line_count,
            items = snapshot.summary.item_count,
            total = %snapshot.summary.grand_total,
            "Cart updated"
        );
    });
    Ok(manager)
}

/// Write the manager's cart back to the session.
async fn save_cart(session: &Session, manager: &CartManager) -> Result<()> {
    session.insert(session_keys::CART, manager.cart()).await?;
    Ok(())
}

/// Whether the request came from the fragment-swapping script.
fn is_fragment_request(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// Parse a product id coming from a form field.
fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse::<ProductId>()
        .map_err(|_| AppError::BadRequest(format!("invalid product id: {raw:?}")))
}

/// Parse a requested quantity coming from a form field.
fn parse_quantity(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("invalid quantity: {raw:?}")))
}

// =============================================================================
// Forms & Templates
// =============================================================================

/// Form data naming a single product.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: String,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityForm {
    pub product_id: String,
    pub quantity: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub count: u64,
}

/// Cart items fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Checkout result page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/result.html")]
pub struct CheckoutTemplate {
    pub purchased: bool,
    pub purchased_items: u64,
    pub purchased_total: String,
    pub count: u64,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<CartShowTemplate> {
    let manager = load_cart(&state, &session).await?;
    let cart = CartView::from(&manager.snapshot());
    let count = cart.item_count;
    Ok(CartShowTemplate { cart, count })
}

/// Cart items fragment.
#[instrument(skip(state, session))]
pub async fn items(State(state): State<AppState>, session: Session) -> Result<CartItemsTemplate> {
    let manager = load_cart(&state, &session).await?;
    Ok(CartItemsTemplate {
        cart: CartView::from(&manager.snapshot()),
    })
}

/// Cart count badge fragment.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<CartCountTemplate> {
    let manager = load_cart(&state, &session).await?;
    Ok(CartCountTemplate {
        count: manager.summary().item_count,
    })
}

/// Cart lines joined with product data, plus totals, as JSON.
#[instrument(skip(state, session))]
pub async fn summary(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<serde_json::Value>> {
    let manager = load_cart(&state, &session).await?;
    let body = serde_json::to_value(manager.snapshot())
        .map_err(|e| AppError::Internal(format!("failed to serialize cart: {e}")))?;
    Ok(Json(body))
}

/// Add one unit of a product.
///
/// Unknown products are ignored; the response is the same as for a
/// successful add so the page simply shows an unchanged count.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let product_id = parse_product_id(&form.product_id)?;
    let mut manager = load_cart(&state, &session).await?;

    match manager.add_item(product_id) {
        AddOutcome::ProductNotFound => {
            tracing::debug!(%product_id, "Ignoring add for unknown product");
        }
        outcome => {
            save_cart(&session, &manager).await?;
            let id = product_id.to_string();
            add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));
            tracing::info!(%product_id, ?outcome, "Item added to cart");
        }
    }

    if !is_fragment_request(&headers) {
        return Ok(Redirect::to("/").into_response());
    }

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: manager.summary().item_count,
        },
    )
        .into_response())
}

/// Remove a line.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let product_id = parse_product_id(&form.product_id)?;
    apply_line_event(&state, &session, &headers, CartEvent::RemoveItem { product_id }).await
}

/// One more unit on a line.
#[instrument(skip(state, session, headers))]
pub async fn increment(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let product_id = parse_product_id(&form.product_id)?;
    apply_line_event(&state, &session, &headers, CartEvent::Increment { product_id }).await
}

/// One less unit on a line; the line disappears at zero.
#[instrument(skip(state, session, headers))]
pub async fn decrement(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let product_id = parse_product_id(&form.product_id)?;
    apply_line_event(&state, &session, &headers, CartEvent::Decrement { product_id }).await
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateQuantityForm>,
) -> Result<Response> {
    let product_id = parse_product_id(&form.product_id)?;
    let quantity = parse_quantity(&form.quantity)?;
    apply_line_event(
        &state,
        &session,
        &headers,
        CartEvent::SetQuantity {
            product_id,
            quantity,
        },
    )
    .await
}

/// Apply an event targeting an existing line and render the result.
async fn apply_line_event(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    event: CartEvent,
) -> Result<Response> {
    let mut manager = load_cart(state, session).await?;

    let outcome = manager.dispatch(event);
    if outcome.is_noop() {
        tracing::debug!(?event, "Cart line not found, nothing to do");
    } else {
        save_cart(session, &manager).await?;
        tracing::info!(?event, ?outcome, "Cart line changed");
    }

    if !is_fragment_request(headers) {
        return Ok(Redirect::to("/cart").into_response());
    }

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&manager.snapshot()),
        },
    )
        .into_response())
}

/// Purchase the cart.
///
/// An empty cart is not an error: the page says there is nothing to buy.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<CheckoutTemplate> {
    let mut manager = load_cart(&state, &session).await?;

    let outcome = manager.checkout();
    match &outcome {
        CheckoutOutcome::Purchased(receipt) => {
            save_cart(&session, &manager).await?;
            add_breadcrumb("cart", "Checked out", None);
            tracing::info!(
                items = receipt.summary.item_count,
                total = %receipt.summary.grand_total,
                "Checkout completed"
            );
        }
        CheckoutOutcome::EmptyCart => {
            tracing::debug!("Checkout requested with an empty cart");
        }
    }

    Ok(checkout_view(outcome))
}

/// Render a checkout outcome. The cart is empty afterwards either way.
fn checkout_view(outcome: CheckoutOutcome) -> CheckoutTemplate {
    match outcome {
        CheckoutOutcome::Purchased(receipt) => CheckoutTemplate {
            purchased: true,
            purchased_items: receipt.summary.item_count,
            purchased_total: filters::format_money(receipt.summary.grand_total),
            count: 0,
        },
        CheckoutOutcome::EmptyCart => CheckoutTemplate {
            purchased: false,
            purchased_items: 0,
            purchased_total: filters::format_money(Decimal::ZERO),
            count: 0,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::HeaderValue;
    use techmart_core::Catalog;

    use super::*;

    #[test]
    fn test_parse_product_id() {
        assert_eq!(parse_product_id("3").unwrap(), ProductId::new(3));
        assert!(matches!(
            parse_product_id("three"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_parse_quantity_allows_negative() {
        assert_eq!(parse_quantity("-2").unwrap(), -2);
        assert_eq!(parse_quantity(" 4 ").unwrap(), 4);
        assert!(parse_quantity("").is_err());
    }

    #[test]
    fn test_is_fragment_request() {
        let mut headers = HeaderMap::new();
        assert!(!is_fragment_request(&headers));
        headers.insert("HX-Request", HeaderValue::from_static("true"));
        assert!(is_fragment_request(&headers));
    }

    #[test]
    fn test_cart_view_from_snapshot() {
        let mut manager = CartManager::new(Arc::new(Catalog::demo()));
        manager.add_item(ProductId::new(1));
        manager.add_item(ProductId::new(1));
        manager.add_item(ProductId::new(5));

        let view = CartView::from(&manager.snapshot());
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "$229.97");
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].name, "Wireless Headphones");
        assert_eq!(view.items[0].price, "$99.99");
        assert_eq!(view.items[0].line_price, "$199.98");
        assert_eq!(view.items[1].product_id, "5");
    }

    #[test]
    fn test_cart_view_of_empty_cart() {
        let manager = CartManager::new(Arc::new(Catalog::demo()));
        let view = CartView::from(&manager.snapshot());
        assert!(view.items.is_empty());
        assert_eq!(view.subtotal, "$0.00");
        assert_eq!(view.item_count, 0);
    }

    #[test]
    fn test_checkout_view_for_each_outcome() {
        let mut manager = CartManager::new(Arc::new(Catalog::demo()));
        let empty = checkout_view(manager.checkout());
        assert!(!empty.purchased);
        assert_eq!(empty.purchased_total, "$0.00");

        manager.add_item(ProductId::new(3));
        manager.add_item(ProductId::new(3));
        let done = checkout_view(manager.checkout());
        assert!(done.purchased);
        assert_eq!(done.purchased_items, 2);
        assert_eq!(done.purchased_total, "$159.98");
        assert_eq!(done.count, 0);
    }
}
