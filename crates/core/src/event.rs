//! UI events and their dispatch onto a [`CartManager`].
//!
//! Parsing raw identifiers into a [`CartEvent`] is the job of whichever
//! front end produced them; by the time an event exists its ids are typed.

use serde::{Deserialize, Serialize};

use crate::cart::{AddOutcome, CartManager, CheckoutOutcome, LineOutcome};
use crate::types::ProductId;

/// A discrete user action against the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum CartEvent {
    AddItem { product_id: ProductId },
    RemoveItem { product_id: ProductId },
    Increment { product_id: ProductId },
    Decrement { product_id: ProductId },
    SetQuantity { product_id: ProductId, quantity: i64 },
    Checkout,
}

/// What a dispatched [`CartEvent`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EventOutcome {
    Add(AddOutcome),
    Line(LineOutcome),
    Checkout(CheckoutOutcome),
}

impl EventOutcome {
    /// Whether the event left the cart untouched because its target was missing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(
            self,
            Self::Add(AddOutcome::ProductNotFound)
                | Self::Line(LineOutcome::LineNotFound)
                | Self::Checkout(CheckoutOutcome::EmptyCart)
        )
    }
}

impl CartManager {
    /// Apply a single event.
    pub fn dispatch(&mut self, event: CartEvent) -> EventOutcome {
        match event {
            CartEvent::AddItem { product_id } => EventOutcome::Add(self.add_item(product_id)),
            CartEvent::RemoveItem { product_id } => {
                EventOutcome::Line(self.remove_item(product_id))
            }
            CartEvent::Increment { product_id } => EventOutcome::Line(self.increment(product_id)),
            CartEvent::Decrement { product_id } => EventOutcome::Line(self.decrement(product_id)),
            CartEvent::SetQuantity {
                product_id,
                quantity,
            } => EventOutcome::Line(self.set_quantity(product_id, quantity)),
            CartEvent::Checkout => EventOutcome::Checkout(self.checkout()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::Catalog;

    fn manager() -> CartManager {
        CartManager::new(Arc::new(Catalog::demo()))
    }

    #[test]
    fn test_dispatch_maps_onto_operations() {
        let mut cart = manager();
        let one = ProductId::new(1);

        assert_eq!(
            cart.dispatch(CartEvent::AddItem { product_id: one }),
            EventOutcome::Add(AddOutcome::Added)
        );
        assert!(matches!(
            cart.dispatch(CartEvent::Increment { product_id: one }),
            EventOutcome::Line(LineOutcome::Updated { .. })
        ));
        assert!(matches!(
            cart.dispatch(CartEvent::SetQuantity {
                product_id: one,
                quantity: 5
            }),
            EventOutcome::Line(LineOutcome::Updated { quantity }) if quantity.get() == 5
        ));
        assert!(matches!(
            cart.dispatch(CartEvent::Checkout),
            EventOutcome::Checkout(CheckoutOutcome::Purchased(_))
        ));
        assert!(cart.dispatch(CartEvent::Checkout).is_noop());
    }

    #[test]
    fn test_noop_detection() {
        let mut cart = manager();
        assert!(
            cart.dispatch(CartEvent::AddItem {
                product_id: ProductId::new(42)
            })
            .is_noop()
        );
        assert!(
            cart.dispatch(CartEvent::Decrement {
                product_id: ProductId::new(1)
            })
            .is_noop()
        );
        assert!(
            !cart
                .dispatch(CartEvent::AddItem {
                    product_id: ProductId::new(1)
                })
                .is_noop()
        );
    }

    #[test]
    fn test_event_json_shape() {
        let event: CartEvent =
            serde_json::from_str(r#"{"event": "set_quantity", "product_id": 3, "quantity": -1}"#)
                .unwrap();
        assert_eq!(
            event,
            CartEvent::SetQuantity {
                product_id: ProductId::new(3),
                quantity: -1
            }
        );
    }
}
