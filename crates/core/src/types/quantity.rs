//! Line quantities.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// A strictly positive item count.
///
/// A cart line can never hold zero units, so the type can't either: the
/// operation that would reach zero removes the line instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, or `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Interpret a requested quantity coming from a caller.
    ///
    /// Anything `<= 0` yields `None`; values beyond `u32::MAX` are clamped.
    #[must_use]
    pub fn from_requested(requested: i64) -> Option<Self> {
        if requested <= 0 {
            return None;
        }
        Self::new(u32::try_from(requested).unwrap_or(u32::MAX))
    }

    /// The underlying count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// One more unit, saturating at `u32::MAX`.
    #[must_use]
    pub const fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_not_a_quantity() {
        assert!(Quantity::new(0).is_none());
        assert_eq!(Quantity::new(4).unwrap().get(), 4);
    }

    #[test]
    fn test_from_requested() {
        assert!(Quantity::from_requested(0).is_none());
        assert!(Quantity::from_requested(-5).is_none());
        assert_eq!(Quantity::from_requested(2).unwrap().get(), 2);
        assert_eq!(Quantity::from_requested(i64::MAX).unwrap().get(), u32::MAX);
    }

    #[test]
    fn test_incremented_saturates() {
        assert_eq!(Quantity::ONE.incremented().get(), 2);
        let max = Quantity::new(u32::MAX).unwrap();
        assert_eq!(max.incremented(), max);
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("3").unwrap().get(), 3);
    }
}
