//! Tick-scaled price and integer quantity types
//!
//! Ladder keys and every hot-path comparison use integers. A `Price` is a
//! count of ticks for some symbol; the tick size that scales it back to a
//! decimal lives on the symbol's [`SymbolSpec`](crate::symbol::SymbolSpec).
//! Floating point never appears in an ordering decision.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Price in ticks
///
/// Strictly positive. Two prices are only comparable within the same symbol.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Create a new Price from a tick count
    ///
    /// # Panics
    /// Panics if `ticks` is zero
    pub fn new(ticks: u64) -> Self {
        assert!(ticks > 0, "Price must be positive");
        Self(ticks)
    }

    /// Try to create a Price, returning None for zero
    pub fn try_new(ticks: u64) -> Option<Self> {
        if ticks > 0 {
            Some(Self(ticks))
        } else {
            None
        }
    }

    pub fn ticks(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order or trade size
///
/// Plain non-negative integer. Admission requires strictly positive sizes;
/// zero is representable so `remaining` can reach it on a full fill.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    pub fn new(units: u64) -> Self {
        Self(units)
    }

    pub fn units(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        assert!(
            self.0 >= rhs.0,
            "Quantity subtraction would result in negative"
        );
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, rhs: Self) {
        assert!(
            self.0 >= rhs.0,
            "Quantity subtraction would result in negative"
        );
        self.0 -= rhs.0;
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Quantity::ZERO, |acc, q| acc + q)
    }
}

impl From<u64> for Quantity {
    fn from(units: u64) -> Self {
        Self(units)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_creation() {
        let price = Price::new(10_000);
        assert_eq!(price.ticks(), 10_000);
    }

    #[test]
    #[should_panic(expected = "Price must be positive")]
    fn test_price_zero_panics() {
        Price::new(0);
    }

    #[test]
    fn test_price_try_new() {
        assert!(Price::try_new(0).is_none());
        assert_eq!(Price::try_new(5), Some(Price::new(5)));
    }

    #[test]
    fn test_price_ordering_is_integer() {
        assert!(Price::new(10_050) > Price::new(10_000));
        assert!(Price::new(9_999) < Price::new(10_000));
    }

    #[test]
    fn test_quantity_arithmetic() {
        let a = Quantity::new(100);
        let b = Quantity::new(30);

        assert_eq!(a + b, Quantity::new(130));
        assert_eq!(a - b, Quantity::new(70));
        assert_eq!(a.min(b), b);
    }

    #[test]
    #[should_panic(expected = "Quantity subtraction would result in negative")]
    fn test_quantity_underflow_panics() {
        let _ = Quantity::new(1) - Quantity::new(2);
    }

    #[test]
    fn test_quantity_sum() {
        let total: Quantity = [10u64, 20, 30].into_iter().map(Quantity::new).sum();
        assert_eq!(total, Quantity::new(60));
    }

    #[test]
    fn test_serialization_is_transparent() {
        let json = serde_json::to_string(&Price::new(42)).unwrap();
        assert_eq!(json, "42");

        let qty: Quantity = serde_json::from_str("17").unwrap();
        assert_eq!(qty, Quantity::new(17));
    }
}
