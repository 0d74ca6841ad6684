//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are plain amounts in the shop's single currency. Currency codes,
//! locale formatting and exchange rates are deliberately absent; the only
//! presentation rule is two-decimal rounding, see [`round_money`].

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places every displayed amount is rounded to.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Largest accepted unit price (one billion).
///
/// At this bound even `u32::MAX` units of every product in a catalog stay far
/// inside `Decimal`'s range.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The amount is above [`MAX_PRICE`].
    #[error("price cannot exceed {MAX_PRICE} (got {0})")]
    TooLarge(Decimal),
}

/// Round a monetary amount to two decimal places.
///
/// Uses standard rounding: halves round away from zero, so `0.125` becomes
/// `0.13` rather than the banker's `0.12`. The result always carries exactly
/// two decimal places, so `10` comes back as `10.00`.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DECIMAL_PLACES);
    rounded
}

/// A non-negative unit price.
///
/// ## Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use techmart_core::Price;
///
/// let price = Price::from_cents(9999);
/// assert_eq!(price.amount(), Decimal::new(9999, 2));
/// assert_eq!(price.to_string(), "99.99");
///
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero and
    /// [`PriceError::TooLarge`] if it is above [`MAX_PRICE`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount > MAX_PRICE {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), MONEY_DECIMAL_PLACES))
    }

    /// The exact amount, without rounding.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Exact price of `quantity` units.
    ///
    /// Saturates at `Decimal::MAX`, which no price within [`MAX_PRICE`] can reach.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0.saturating_mul(Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", round_money(self.0))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money_midpoint_away_from_zero() {
        assert_eq!(round_money(Decimal::new(125, 3)), Decimal::new(13, 2));
        assert_eq!(round_money(Decimal::new(135, 3)), Decimal::new(14, 2));
        assert_eq!(round_money(Decimal::new(1234, 3)), Decimal::new(123, 2));
    }

    #[test]
    fn test_round_money_keeps_two_places() {
        assert_eq!(round_money(Decimal::new(29997, 2)), Decimal::new(29997, 2));
        assert_eq!(round_money(Decimal::ZERO).to_string(), "0.00");
        assert_eq!(round_money(Decimal::new(20, 0)).to_string(), "20.00");
        assert_eq!(round_money(Decimal::new(15, 1)).to_string(), "1.50");
    }

    #[test]
    fn test_new_rejects_negative() {
        assert!(matches!(
            Price::new(Decimal::new(-1, 2)),
            Err(PriceError::Negative(_))
        ));
    }

    #[test]
    fn test_new_rejects_above_max() {
        assert_eq!(Price::new(MAX_PRICE).unwrap().amount(), MAX_PRICE);
        assert!(matches!(
            Price::new(MAX_PRICE + Decimal::new(1, 2)),
            Err(PriceError::TooLarge(_))
        ));
        assert!(matches!(Price::new(Decimal::MAX), Err(PriceError::TooLarge(_))));
    }

    #[test]
    fn test_times_at_max_price_and_quantity() {
        let price = Price::new(MAX_PRICE).unwrap();
        assert_eq!(
            price.times(u32::MAX),
            Decimal::from(u64::from(u32::MAX) * 1_000_000_000)
        );
    }

    #[test]
    fn test_new_accepts_zero() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_times() {
        let price = Price::from_cents(9999);
        assert_eq!(price.times(3), Decimal::new(29997, 2));
        assert_eq!(price.times(0), Decimal::ZERO);
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_cents(500).to_string(), "5.00");
        assert_eq!(Price::new(Decimal::new(19995, 3)).unwrap().to_string(), "20.00");
    }

    #[test]
    fn test_deserialize_validates() {
        let price: Price = serde_json::from_str("\"49.99\"").unwrap();
        assert_eq!(price, Price::from_cents(4999));

        assert!(serde_json::from_str::<Price>("\"-3.00\"").is_err());
        assert!(serde_json::from_str::<Price>("\"79228162514264337593543950335\"").is_err());
    }
}
