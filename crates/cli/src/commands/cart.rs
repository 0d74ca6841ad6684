//! `cart replay`.
//!
//! Events are parsed up front, so a typo anywhere in the list aborts before
//! the cart is touched.

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use techmart_core::{CartEvent, CartManager, CartSummary, Catalog, EventOutcome, ProductId};

use super::CommandError;

/// One replayed step, as printed.
#[derive(Debug, Serialize)]
struct Step<'a> {
    input: &'a str,
    event: CartEvent,
    result: EventOutcome,
}

/// Final state, as printed.
#[derive(Debug, Serialize)]
struct Final {
    summary: CartSummary,
}

/// Parse a single event written as `verb[:ID[=QTY]]`.
///
/// # Errors
///
/// Returns [`CommandError::InvalidEvent`] for unknown verbs, missing or
/// malformed ids, or a malformed quantity.
pub fn parse_event(input: &str) -> Result<CartEvent, CommandError> {
    let invalid = |reason: &str| CommandError::InvalidEvent {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let (verb, argument) = match input.trim().split_once(':') {
        Some((verb, argument)) => (verb, Some(argument)),
        None => (input.trim(), None),
    };

    let product_id = |raw: &str| {
        raw.parse::<ProductId>()
            .map_err(|_| invalid("product id must be an integer"))
    };

    match (verb.to_ascii_lowercase().as_str(), argument) {
        ("checkout", None) => Ok(CartEvent::Checkout),
        ("add", Some(raw)) => Ok(CartEvent::AddItem {
            product_id: product_id(raw)?,
        }),
        ("remove" | "rm", Some(raw)) => Ok(CartEvent::RemoveItem {
            product_id: product_id(raw)?,
        }),
        ("inc" | "increment", Some(raw)) => Ok(CartEvent::Increment {
            product_id: product_id(raw)?,
        }),
        ("dec" | "decrement", Some(raw)) => Ok(CartEvent::Decrement {
            product_id: product_id(raw)?,
        }),
        ("set", Some(raw)) => {
            let (id, quantity) = raw
                .split_once('=')
                .ok_or_else(|| invalid("expected set:ID=QTY"))?;
            let quantity = quantity
                .trim()
                .parse::<i64>()
                .map_err(|_| invalid("quantity must be an integer"))?;
            Ok(CartEvent::SetQuantity {
                product_id: product_id(id)?,
                quantity,
            })
        }
        ("checkout", Some(_)) => Err(invalid("checkout takes no argument")),
        ("add" | "remove" | "rm" | "inc" | "increment" | "dec" | "decrement" | "set", None) => {
            Err(invalid("missing product id"))
        }
        _ => Err(invalid("unknown event")),
    }
}

/// Replay `inputs` against an empty cart, writing one JSON line per step
/// followed by the final summary.
///
/// # Errors
///
/// Returns an error if any event fails to parse (nothing is applied in that
/// case) or if writing fails.
pub fn replay(
    catalog: Catalog,
    inputs: &[String],
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let events = inputs
        .iter()
        .map(|input| parse_event(input))
        .collect::<Result<Vec<_>, _>>()?;

    let mut manager = CartManager::new(Arc::new(catalog));
    manager.subscribe(|snapshot| {
        tracing::debug!(
            lines = snapshot.summary.line_count,
            items = snapshot.summary.item_count,
            "Cart changed"
        );
    });

    for (input, event) in inputs.iter().zip(events) {
        let result = manager.dispatch(event);
        if result.is_noop() {
            tracing::warn!(%input, "Event had no effect");
        }
        serde_json::to_writer(
            &mut *out,
            &Step {
                input,
                event,
                result,
            },
        )?;
        writeln!(out)?;
    }

    serde_json::to_writer_pretty(
        &mut *out,
        &Final {
            summary: manager.summary(),
        },
    )?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn replay_lines(inputs: &[&str]) -> Vec<serde_json::Value> {
        let inputs: Vec<String> = inputs.iter().map(ToString::to_string).collect();
        let mut out = Vec::new();
        replay(Catalog::demo(), &inputs, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        // Steps are one per line; the pretty-printed summary follows.
        let mut values = Vec::new();
        let mut lines = text.lines();
        for _ in 0..inputs.len() {
            values.push(serde_json::from_str(lines.next().unwrap()).unwrap());
        }
        let rest: Vec<&str> = lines.collect();
        values.push(serde_json::from_str(&rest.join("\n")).unwrap());
        values
    }

    #[test]
    fn test_parse_event_variants() {
        assert_eq!(parse_event("checkout").unwrap(), CartEvent::Checkout);
        assert_eq!(
            parse_event("add:3").unwrap(),
            CartEvent::AddItem {
                product_id: ProductId::new(3)
            }
        );
        assert_eq!(
            parse_event("DEC:2").unwrap(),
            CartEvent::Decrement {
                product_id: ProductId::new(2)
            }
        );
        assert_eq!(
            parse_event("set:1=-4").unwrap(),
            CartEvent::SetQuantity {
                product_id: ProductId::new(1),
                quantity: -4
            }
        );
    }

    #[test]
    fn test_parse_event_errors() {
        for bad in ["", "add", "add:x", "set:1", "set:1=many", "checkout:1", "buy:1"] {
            assert!(
                matches!(parse_event(bad), Err(CommandError::InvalidEvent { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_replay_scenario() {
        let values = replay_lines(&["add:1", "add:2", "add:1"]);
        assert_eq!(values.len(), 4);
        assert_eq!(values[0]["result"]["outcome"], "added");
        assert_eq!(values[2]["result"]["outcome"], "incremented");
        assert_eq!(values[2]["result"]["quantity"], 2);

        let summary = &values[3]["summary"];
        assert_eq!(summary["line_count"], 2);
        assert_eq!(summary["item_count"], 3);
        assert_eq!(summary["grand_total"], "399.97");
    }

    #[test]
    fn test_replay_checkout_empty() {
        let values = replay_lines(&["checkout"]);
        assert_eq!(values[0]["result"]["outcome"], "empty_cart");
        assert_eq!(values[1]["summary"]["line_count"], 0);
    }

    #[test]
    fn test_replay_rejects_before_applying() {
        let inputs = vec!["add:1".to_string(), "nonsense".to_string()];
        let mut out = Vec::new();
        let result = replay(Catalog::demo(), &inputs, &mut out);
        assert!(matches!(result, Err(CommandError::InvalidEvent { .. })));
        assert!(out.is_empty());
    }
}
