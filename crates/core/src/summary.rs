//! Derived, read-only views of a cart.
//!
//! Nothing here is stored: a [`CartSummary`] or [`CartSnapshot`] is computed
//! from the current lines and the catalog every time it is asked for.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::Cart;
use crate::catalog::{Catalog, Product};
use crate::types::{ProductId, Quantity, round_money};

/// Totals for a single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineSummary {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price, rounded to two decimals.
    pub unit_price: Decimal,
    /// Unit price times quantity, rounded to two decimals.
    pub subtotal: Decimal,
}

/// Totals for the whole cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Number of distinct lines.
    pub line_count: usize,
    /// Sum of all line quantities.
    pub item_count: u64,
    pub lines: Vec<LineSummary>,
    /// Sum of unit price times quantity over all lines, rounded to two decimals.
    pub grand_total: Decimal,
}

impl CartSummary {
    /// Summary of an empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            line_count: 0,
            item_count: 0,
            lines: Vec::new(),
            grand_total: Decimal::ZERO,
        }
    }

    /// Compute the summary for `cart`, pricing lines from `catalog`.
    ///
    /// Lines whose product is missing from the catalog are skipped.
    #[must_use]
    pub fn compute(cart: &Cart, catalog: &Catalog) -> Self {
        let mut exact_total = Decimal::ZERO;
        let mut item_count = 0_u64;
        let mut lines = Vec::with_capacity(cart.len());

        for line in cart.lines() {
            let Some(product) = catalog.get(line.product_id) else {
                continue;
            };
            let quantity = line.quantity.get();
            let exact = product.price.times(quantity);
            exact_total = exact_total.saturating_add(exact);
            item_count = item_count.saturating_add(u64::from(quantity));
            lines.push(LineSummary {
                product_id: line.product_id,
                quantity,
                unit_price: round_money(product.price.amount()),
                subtotal: round_money(exact),
            });
        }

        Self {
            line_count: lines.len(),
            item_count,
            lines,
            grand_total: round_money(exact_total),
        }
    }

    /// Whether the cart had no lines.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.line_count == 0
    }
}

impl Default for CartSummary {
    fn default() -> Self {
        Self::empty()
    }
}

/// A cart line joined with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotLine<'a> {
    pub product: &'a Product,
    pub quantity: Quantity,
    pub subtotal: Decimal,
}

/// Everything a renderer needs after a cart change: the ordered lines with
/// their product data, plus the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot<'a> {
    pub lines: Vec<SnapshotLine<'a>>,
    pub summary: CartSummary,
}

impl<'a> CartSnapshot<'a> {
    /// Join `cart` with `catalog`.
    #[must_use]
    pub fn build(cart: &Cart, catalog: &'a Catalog) -> Self {
        let summary = CartSummary::compute(cart, catalog);
        let lines = cart
            .lines()
            .iter()
            .filter_map(|line| {
                catalog.get(line.product_id).map(|product| SnapshotLine {
                    product,
                    quantity: line.quantity,
                    subtotal: round_money(product.price.times(line.quantity.get())),
                })
            })
            .collect();
        Self { lines, summary }
    }

    /// Whether there is nothing in the cart.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::types::Price;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Product {
                id: ProductId::new(1),
                name: "Headphones".to_string(),
                description: String::new(),
                price: Price::from_cents(9999),
                image_ref: String::new(),
            },
            Product {
                id: ProductId::new(2),
                name: "Thirds".to_string(),
                description: String::new(),
                // 0.335 per unit: exact totals need rounding
                price: Price::new(Decimal::new(335, 3)).unwrap(),
                image_ref: String::new(),
            },
        ])
        .unwrap()
    }

    fn cart(lines: &[(i32, u32)]) -> Cart {
        let lines = lines
            .iter()
            .map(|&(id, qty)| crate::cart::CartLine {
                product_id: ProductId::new(id),
                quantity: Quantity::new(qty).unwrap(),
            })
            .collect::<Vec<_>>();
        Cart::try_from(lines).unwrap()
    }

    #[test]
    fn test_empty_cart() {
        let summary = CartSummary::compute(&Cart::default(), &catalog());
        assert_eq!(summary, CartSummary::empty());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_line_and_grand_totals() {
        let summary = CartSummary::compute(&cart(&[(1, 3)]), &catalog());
        assert_eq!(summary.line_count, 1);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.lines[0].subtotal, Decimal::new(29997, 2));
        assert_eq!(summary.grand_total, Decimal::new(29997, 2));
    }

    #[test]
    fn test_rounding_applies_to_exact_sum() {
        // 1 x 0.335 = 0.335 -> 0.34 on the line; 3 x 0.335 = 1.005 -> 1.01 overall
        let summary = CartSummary::compute(&cart(&[(2, 3)]), &catalog());
        assert_eq!(summary.lines[0].unit_price, Decimal::new(34, 2));
        assert_eq!(summary.lines[0].subtotal, Decimal::new(101, 2));
        assert_eq!(summary.grand_total, Decimal::new(101, 2));
    }

    #[test]
    fn test_amounts_always_have_two_places() {
        let summary = CartSummary::compute(&Cart::default(), &catalog());
        assert_eq!(summary.grand_total.to_string(), "0.00");

        let whole = Catalog::from_json(
            r#"[{"id": 1, "name": "Ten", "description": "", "price": "10", "image_ref": ""}]"#,
        )
        .unwrap();
        let summary = CartSummary::compute(&cart(&[(1, 2)]), &whole);
        assert_eq!(summary.lines[0].unit_price.to_string(), "10.00");
        assert_eq!(summary.lines[0].subtotal.to_string(), "20.00");
        assert_eq!(
            serde_json::to_value(&summary).unwrap()["grand_total"],
            "20.00"
        );
    }

    #[test]
    fn test_max_price_at_max_quantity_does_not_overflow() {
        let expensive = Catalog::new(vec![
            Product {
                id: ProductId::new(1),
                name: "Yacht".to_string(),
                description: String::new(),
                price: Price::new(crate::types::MAX_PRICE).unwrap(),
                image_ref: String::new(),
            },
            Product {
                id: ProductId::new(2),
                name: "Jet".to_string(),
                description: String::new(),
                price: Price::new(crate::types::MAX_PRICE).unwrap(),
                image_ref: String::new(),
            },
        ])
        .unwrap();
        let summary = CartSummary::compute(&cart(&[(1, u32::MAX), (2, u32::MAX)]), &expensive);
        assert_eq!(summary.item_count, 2 * u64::from(u32::MAX));
        assert_eq!(
            summary.grand_total,
            Decimal::from(2 * u64::from(u32::MAX) * 1_000_000_000)
        );
    }

    #[test]
    fn test_unknown_products_are_skipped() {
        let summary = CartSummary::compute(&cart(&[(1, 1), (99, 4)]), &catalog());
        assert_eq!(summary.line_count, 1);
        assert_eq!(summary.item_count, 1);
    }

    #[test]
    fn test_snapshot_joins_products_in_order() {
        let catalog = catalog();
        let snapshot = CartSnapshot::build(&cart(&[(2, 2), (1, 1)]), &catalog);
        let names: Vec<&str> = snapshot.lines.iter().map(|l| l.product.name.as_str()).collect();
        assert_eq!(names, vec!["Thirds", "Headphones"]);
        assert_eq!(snapshot.lines[0].subtotal, Decimal::new(67, 2));
        assert_eq!(snapshot.summary.item_count, 3);
    }
}
