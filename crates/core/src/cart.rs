//! Cart lines and the cart manager.
//!
//! # State machine (per product)
//!
//! ```text
//! absent        --add-->               present(1)
//! present(n)    --add-->               present(n + 1)
//! present(n)    --set_quantity(m>=1)-> present(m)
//! present(_)    --remove-->            absent
//! present(_)    --set_quantity(m<=0)-> absent
//! ```
//!
//! Requests that name an unknown product or a missing line are no-ops and
//! are reported through the returned outcome, never as an error.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::summary::{CartSnapshot, CartSummary};
use crate::types::{ProductId, Quantity};

/// Errors that can occur when restoring a [`Cart`] from stored lines.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// More than one line refers to the same product.
    #[error("product {0} appears on more than one cart line")]
    DuplicateLine(ProductId),
}

/// One product's quantity entry in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

/// Ordered cart lines, at most one per product.
///
/// Lines keep the order in which products were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// All lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }

    fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    fn clear(&mut self) {
        self.lines.clear();
    }
}

impl TryFrom<Vec<CartLine>> for Cart {
    type Error = CartError;

    fn try_from(lines: Vec<CartLine>) -> Result<Self, Self::Error> {
        for (position, line) in lines.iter().enumerate() {
            if lines
                .iter()
                .skip(position + 1)
                .any(|other| other.product_id == line.product_id)
            {
                return Err(CartError::DuplicateLine(line.product_id));
            }
        }
        Ok(Self { lines })
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

/// Result of [`CartManager::add_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AddOutcome {
    /// A new line was appended with quantity 1.
    Added,
    /// An existing line went up by one.
    Incremented { quantity: Quantity },
    /// The product id is not in the catalog; nothing changed.
    ProductNotFound,
}

/// Result of the operations that target an existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum LineOutcome {
    /// The line now holds `quantity` units.
    Updated { quantity: Quantity },
    /// The line was deleted.
    Removed,
    /// There was no line for the product; nothing changed.
    LineNotFound,
}

/// Confirmation handed back by a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// What was in the cart at the moment of purchase.
    pub summary: CartSummary,
}

/// Result of [`CartManager::checkout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum CheckoutOutcome {
    /// The cart was emptied.
    Purchased(Receipt),
    /// There was nothing to purchase; the cart is unchanged.
    EmptyCart,
}

impl CheckoutOutcome {
    /// Whether the checkout went through.
    #[must_use]
    pub const fn is_purchased(&self) -> bool {
        matches!(self, Self::Purchased(_))
    }
}

type Listener = Box<dyn Fn(&CartSnapshot<'_>) + Send + Sync>;

/// Owns a [`Cart`] and applies catalog-validated operations to it.
///
/// Every operation runs to completion synchronously. After an operation
/// changes the cart, subscribed listeners receive a fresh [`CartSnapshot`].
pub struct CartManager {
    catalog: Arc<Catalog>,
    cart: Cart,
    listeners: Vec<Listener>,
}

impl CartManager {
    /// A manager with an empty cart.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            cart: Cart::new(),
            listeners: Vec::new(),
        }
    }

    /// A manager resuming a previously stored cart.
    ///
    /// Lines for products that are no longer in the catalog are dropped.
    #[must_use]
    pub fn with_cart(catalog: Arc<Catalog>, mut cart: Cart) -> Self {
        cart.lines.retain(|line| catalog.contains(line.product_id));
        Self {
            catalog,
            cart,
            listeners: Vec::new(),
        }
    }

    /// Register a listener called after every state change.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&CartSnapshot<'_>) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Add one unit of `product_id`.
    pub fn add_item(&mut self, product_id: ProductId) -> AddOutcome {
        if !self.catalog.contains(product_id) {
            return AddOutcome::ProductNotFound;
        }

        let outcome = if let Some(line) = self.cart.line_mut(product_id) {
            line.quantity = line.quantity.incremented();
            AddOutcome::Incremented {
                quantity: line.quantity,
            }
        } else {
            self.cart.lines.push(CartLine {
                product_id,
                quantity: Quantity::ONE,
            });
            AddOutcome::Added
        };

        self.notify();
        outcome
    }

    /// Delete the line for `product_id`. Idempotent.
    pub fn remove_item(&mut self, product_id: ProductId) -> LineOutcome {
        if self.cart.remove(product_id) {
            self.notify();
            LineOutcome::Removed
        } else {
            LineOutcome::LineNotFound
        }
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero or less removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, new_quantity: i64) -> LineOutcome {
        let Some(line) = self.cart.line_mut(product_id) else {
            return LineOutcome::LineNotFound;
        };

        match Quantity::from_requested(new_quantity) {
            Some(quantity) => {
                line.quantity = quantity;
                self.notify();
                LineOutcome::Updated { quantity }
            }
            None => self.remove_item(product_id),
        }
    }

    /// One more unit on an existing line.
    pub fn increment(&mut self, product_id: ProductId) -> LineOutcome {
        match self.cart.line(product_id) {
            Some(line) => {
                let next = i64::from(line.quantity.get()) + 1;
                self.set_quantity(product_id, next)
            }
            None => LineOutcome::LineNotFound,
        }
    }

    /// One less unit on an existing line, removing it at zero.
    pub fn decrement(&mut self, product_id: ProductId) -> LineOutcome {
        match self.cart.line(product_id) {
            Some(line) => {
                let next = i64::from(line.quantity.get()) - 1;
                self.set_quantity(product_id, next)
            }
            None => LineOutcome::LineNotFound,
        }
    }

    /// Purchase everything in the cart.
    ///
    /// On a non-empty cart the lines are cleared and a [`Receipt`] returned.
    /// On an empty cart nothing happens and [`CheckoutOutcome::EmptyCart`]
    /// is returned.
    pub fn checkout(&mut self) -> CheckoutOutcome {
        if self.cart.is_empty() {
            return CheckoutOutcome::EmptyCart;
        }

        let summary = self.summary();
        self.cart.clear();
        self.notify();
        CheckoutOutcome::Purchased(Receipt { summary })
    }

    /// Current totals.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::compute(&self.cart, &self.catalog)
    }

    /// Current lines joined with their products, plus totals.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot<'_> {
        CartSnapshot::build(&self.cart, &self.catalog)
    }

    /// The underlying cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The catalog this manager validates against.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Give up the manager, keeping the cart.
    #[must_use]
    pub fn into_cart(self) -> Cart {
        self.cart
    }

    fn notify(&self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for listener in &self.listeners {
            listener(&snapshot);
        }
    }
}

impl fmt::Debug for CartManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartManager")
            .field("catalog_len", &self.catalog.len())
            .field("cart", &self.cart)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
