//! Line item quantity, clamped to `[1, 999]`.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Number of pieces of one line item in a cart.
///
/// A `Quantity` can never be zero, negative or above 999. Every constructor
/// normalizes its input instead of rejecting it: removing a line goes through
/// an explicit remove, never through a zero quantity.
///
/// ## Clamping rules
///
/// - Non-finite input (`NaN`, `±∞`) becomes 1
/// - Fractions are floored (`2.9` becomes 2)
/// - Anything below 1 after flooring becomes 1
/// - Anything above 999 becomes 999
///
/// ```
/// use galeria_core::Quantity;
///
/// assert_eq!(Quantity::clamp(0.0).get(), 1);
/// assert_eq!(Quantity::clamp(5000.0).get(), 999);
/// assert_eq!(Quantity::clamp(f64::NAN).get(), 1);
/// assert_eq!(Quantity::clamp(3.7).get(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest quantity a line item can hold.
    pub const MIN: Self = Self(1);
    /// Largest quantity a line item can hold.
    pub const MAX: Self = Self(999);

    /// Clamp an arbitrary number into a valid quantity.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // bounded to [1, 999] before the cast
    pub fn clamp(n: f64) -> Self {
        if !n.is_finite() {
            return Self::MIN;
        }

        let floored = n.floor();
        if floored < f64::from(Self::MIN.0) {
            Self::MIN
        } else if floored > f64::from(Self::MAX.0) {
            Self::MAX
        } else {
            Self(floored as u32)
        }
    }

    /// Clamp an integer count into a valid quantity.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // bounded to [1, 999] before the cast
    pub const fn from_count(n: i64) -> Self {
        if n < 1 {
            Self::MIN
        } else if n > 999 {
            Self::MAX
        } else {
            Self(n as u32)
        }
    }

    /// Returns the quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Clamp `self + step`.
    #[must_use]
    pub fn offset(self, step: f64) -> Self {
        Self::clamp(f64::from(self.0) + step)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

// Persisted snapshots may have been written by older or foreign clients, so
// deserialization normalizes instead of failing.
impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = f64::deserialize(deserializer)?;
        Ok(Self::clamp(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_in_range() {
        assert_eq!(Quantity::clamp(1.0).get(), 1);
        assert_eq!(Quantity::clamp(42.0).get(), 42);
        assert_eq!(Quantity::clamp(999.0).get(), 999);
    }

    #[test]
    fn test_clamp_low_values() {
        assert_eq!(Quantity::clamp(0.0).get(), 1);
        assert_eq!(Quantity::clamp(-3.0).get(), 1);
        assert_eq!(Quantity::clamp(0.5).get(), 1);
    }

    #[test]
    fn test_clamp_high_values() {
        assert_eq!(Quantity::clamp(1000.0).get(), 999);
        assert_eq!(Quantity::clamp(5000.0).get(), 999);
        assert_eq!(Quantity::clamp(f64::MAX).get(), 999);
    }

    #[test]
    fn test_clamp_non_finite() {
        assert_eq!(Quantity::clamp(f64::NAN).get(), 1);
        assert_eq!(Quantity::clamp(f64::INFINITY).get(), 1);
        assert_eq!(Quantity::clamp(f64::NEG_INFINITY).get(), 1);
    }

    #[test]
    fn test_clamp_floors_fractions() {
        assert_eq!(Quantity::clamp(2.9).get(), 2);
        assert_eq!(Quantity::clamp(998.99).get(), 998);
    }

    #[test]
    fn test_from_count() {
        assert_eq!(Quantity::from_count(0).get(), 1);
        assert_eq!(Quantity::from_count(7).get(), 7);
        assert_eq!(Quantity::from_count(i64::MAX).get(), 999);
        assert_eq!(Quantity::from_count(i64::MIN).get(), 1);
    }

    #[test]
    fn test_offset() {
        let q = Quantity::clamp(5.0);
        assert_eq!(q.offset(1.0).get(), 6);
        assert_eq!(q.offset(-10.0).get(), 1);
        assert_eq!(Quantity::MAX.offset(1.0).get(), 999);
    }

    #[test]
    fn test_deserialize_clamps() {
        let q: Quantity = serde_json::from_str("0").expect("number");
        assert_eq!(q, Quantity::MIN);
        let q: Quantity = serde_json::from_str("12345").expect("number");
        assert_eq!(q, Quantity::MAX);
        let q: Quantity = serde_json::from_str("3").expect("number");
        assert_eq!(q.get(), 3);
    }
}
