//! # Quantity Module
//!
//! Stock quantities for unit, weight and volume products.
//!
//! ## Milli-Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product            Wire (JSON)      Stored (INTEGER)                   │
//! │  ─────────────────  ───────────────  ─────────────────                  │
//! │  Bread (unit)       3                3000                               │
//! │  Cheese (weight)    1.25  (kg)       1250                               │
//! │  Milk (volume)      0.5   (l)        500                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quantities are integer thousandths of the product's measuring unit, the
//! same trick `Money` plays with cents. Adding and subtracting stock is exact;
//! the browser still sends and receives plain decimal numbers.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Milli-units in one whole unit.
pub const MILLI_PER_UNIT: i64 = 1000;

/// A stock quantity in thousandths of a unit.
///
/// Negative quantities are legal: a sale never checks stock sufficiency, so a
/// product can be oversold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Quantity(i64);

impl Quantity {
    /// Exactly one unit. Item withdrawals always move this much stock.
    pub const ONE: Quantity = Quantity(MILLI_PER_UNIT);

    /// Creates a quantity from milli-units.
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * MILLI_PER_UNIT)
    }

    /// Creates a quantity from a decimal number, rounded to the nearest
    /// milli-unit.
    ///
    /// Returns `None` for NaN, infinities and values too large to store.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::quantity::Quantity;
    ///
    /// assert_eq!(Quantity::from_decimal(1.25).unwrap().milli(), 1250);
    /// assert_eq!(Quantity::from_decimal(0.0004).unwrap().milli(), 0);
    /// assert!(Quantity::from_decimal(f64::NAN).is_none());
    /// ```
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }

        let milli = (value * MILLI_PER_UNIT as f64).round();
        if milli.abs() >= i64::MAX as f64 {
            return None;
        }

        Some(Quantity(milli as i64))
    }

    /// Returns the raw milli-unit count.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    /// Returns the quantity as a decimal number (for display and JSON).
    #[inline]
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / MILLI_PER_UNIT as f64
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Quantity {
    /// Formats without trailing zeros: `3`, `1.25`, `-0.5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / MILLI_PER_UNIT as u64;
        let frac = abs % MILLI_PER_UNIT as u64;

        if frac == 0 {
            return write!(f, "{}{}", sign, whole);
        }

        let digits = format!("{:03}", frac);
        write!(f, "{}{}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % MILLI_PER_UNIT == 0 {
            serializer.serialize_i64(self.0 / MILLI_PER_UNIT)
        } else {
            serializer.serialize_f64(self.as_decimal())
        }
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Quantity::from_decimal(value)
            .ok_or_else(|| de::Error::custom(format!("invalid quantity: {}", value)))
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units_and_milli() {
        assert_eq!(Quantity::from_units(3).milli(), 3000);
        assert_eq!(Quantity::ONE, Quantity::from_milli(1000));
    }

    #[test]
    fn test_from_decimal_rounds_to_milli() {
        assert_eq!(Quantity::from_decimal(0.1).unwrap().milli(), 100);
        assert_eq!(Quantity::from_decimal(2.0006).unwrap().milli(), 2001);
        assert_eq!(Quantity::from_decimal(-1.5).unwrap().milli(), -1500);
        assert!(Quantity::from_decimal(f64::INFINITY).is_none());
        assert!(Quantity::from_decimal(1e300).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Quantity::from_units(3).to_string(), "3");
        assert_eq!(Quantity::from_milli(1250).to_string(), "1.25");
        assert_eq!(Quantity::from_milli(-500).to_string(), "-0.5");
        assert_eq!(Quantity::from_milli(5).to_string(), "0.005");
    }

    #[test]
    fn test_json_shape() {
        assert_eq!(serde_json::to_string(&Quantity::from_units(4)).unwrap(), "4");
        assert_eq!(serde_json::to_string(&Quantity::from_milli(1500)).unwrap(), "1.5");

        let q: Quantity = serde_json::from_str("2").unwrap();
        assert_eq!(q.milli(), 2000);
        let q: Quantity = serde_json::from_str("0.75").unwrap();
        assert_eq!(q.milli(), 750);
        assert!(serde_json::from_str::<Quantity>("\"lots\"").is_err());
    }

    #[test]
    fn test_arithmetic() {
        let mut stock = Quantity::from_units(10);
        stock -= Quantity::from_milli(2500);
        assert_eq!(stock.milli(), 7500);
        stock += Quantity::ONE;
        assert_eq!(stock.milli(), 8500);
        assert!((Quantity::zero() - Quantity::ONE).is_negative());
    }
}
