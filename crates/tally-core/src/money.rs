//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A day of profit summed as floats drifts by fractions of a cent.       │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every price, amount and profit is an i64 count of cents.            │
//! │    The only rounding happens once per sale line (price × quantity).    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//! use tally_core::quantity::Quantity;
//!
//! let price = Money::from_cents(1099); // $10.99
//!
//! let doubled = price * 2;                       // $21.98
//! let total = price + Money::from_cents(500);    // $15.99
//! let half_kg = price.times(Quantity::from_milli(500)); // $5.50 (rounded)
//! assert_eq!(half_kg.cents(), 550);
//! ```

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::quantity::{Quantity, MILLI_PER_UNIT};

/// Cents in one whole currency unit.
pub const CENTS_PER_UNIT: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: profit can be negative (selling below cost)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Decimal on the wire**: JSON carries `2.5`, storage carries `250`
/// - **Saturating operators**: `+`, `-` and `*` clamp at the i64 bounds;
///   the ledger uses the `checked_*` methods and rejects overflow
///
/// ## Where Money is Used
/// ```text
/// Product.cost_price ───────┐
///                           ├──► SaleItem.profit ──► Sale.total_profit
/// SaleLine.selling_price ───┘                             │
///                                                         ▼
/// Withdrawal.amount ──────────────────────────────► Dashboard.totalProfit
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Creates a Money value from a decimal currency amount, rounded to the
    /// nearest cent.
    ///
    /// Returns `None` for NaN, infinities and values too large to store.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(2.5).unwrap().cents(), 250);
    /// assert_eq!(Money::from_decimal(0.105).unwrap().cents(), 11);
    /// assert!(Money::from_decimal(f64::INFINITY).is_none());
    /// ```
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }

        // Scale through the decimal string form so 0.105 rounds like it reads
        let cents = format!("{:.3}", value * CENTS_PER_UNIT as f64)
            .parse::<f64>()
            .ok()?
            .round();
        if cents.abs() >= i64::MAX as f64 {
            return None;
        }

        Some(Money(cents as i64))
    }

    /// Returns the value as a decimal currency amount (for JSON).
    #[inline]
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }

    /// Returns the major unit (dollars) portion.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).dollars(), 10);
    /// assert_eq!(Money::from_cents(-550).dollars(), -5);
    /// ```
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Subtracts two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplies a per-unit price by a (possibly fractional) quantity.
    ///
    /// The result is rounded half away from zero to the nearest cent, so
    /// `$0.05 × 0.5` gives `$0.03` and `-$0.05 × 0.5` gives `-$0.03`.
    /// Returns `None` when the result does not fit in an i64.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::quantity::Quantity;
    ///
    /// let per_kg = Money::from_cents(399);          // $3.99 / kg
    /// let line = per_kg.checked_times(Quantity::from_milli(1250)); // 1.25 kg
    /// assert_eq!(line.map(|m| m.cents()), Some(499)); // $4.9875 → $4.99
    ///
    /// assert!(Money::from_cents(i64::MAX).checked_times(Quantity::from_units(2)).is_none());
    /// ```
    pub fn checked_times(&self, qty: Quantity) -> Option<Money> {
        i64::try_from(self.rounded_product(qty)).ok().map(Money)
    }

    /// Like [`Money::checked_times`], saturating at the i64 bounds.
    pub fn times(&self, qty: Quantity) -> Money {
        let rounded = self.rounded_product(qty);
        Money(rounded.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// `self × qty` in cents, rounded half away from zero. i128 keeps
    /// cents × milli-units from overflowing.
    fn rounded_product(&self, qty: Quantity) -> i128 {
        let product = self.0 as i128 * qty.milli() as i128;
        let divisor = MILLI_PER_UNIT as i128;
        let half = divisor / 2;

        if product >= 0 {
            (product + half) / divisor
        } else {
            (product - half) / divisor
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$10.99` (debugging and seed output only).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by a whole count.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

/// JSON form: whole amounts as integers (`3`), others as decimals (`2.5`).
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % CENTS_PER_UNIT == 0 {
            serializer.serialize_i64(self.0 / CENTS_PER_UNIT)
        } else {
            serializer.serialize_f64(self.as_decimal())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::from_decimal(value)
            .ok_or_else(|| de::Error::custom(format!("invalid amount: {}", value)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// `#[serde(with = "...")]` adapter for integer-cent fields, so records can
/// keep plain `i64` columns while JSON carries decimal currency amounts.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Line {
///     #[serde(rename = "price")]
///     #[serde(with = "tally_core::money::decimal")]
///     price_cents: i64,
/// }
///
/// let line: Line = serde_json::from_str(r#"{"price": 2.5}"#).unwrap();
/// assert_eq!(line.price_cents, 250);
/// assert_eq!(serde_json::to_string(&line).unwrap(), r#"{"price":2.5}"#);
/// ```
pub mod decimal {
    use super::Money;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        Money::from_cents(*cents).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Money::deserialize(deserializer).map(|m| m.cents())
    }

    /// Same adapter for `Option<i64>` fields.
    pub mod option {
        use super::Money;
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer>(
            cents: &Option<i64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            cents.map(Money::from_cents).serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<i64>, D::Error> {
            Option::<Money>::deserialize(deserializer).map(|m| m.map(|m| m.cents()))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((-a).cents(), -1000);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_times_whole_units() {
        let unit_price = Money::from_cents(299);
        assert_eq!(unit_price.times(Quantity::from_units(3)).cents(), 897);
    }

    #[test]
    fn test_times_rounds_half_away_from_zero() {
        let nickel = Money::from_cents(5);
        let half = Quantity::from_milli(500);
        assert_eq!(nickel.times(half).cents(), 3);
        assert_eq!((-nickel).times(half).cents(), -3);
    }

    #[test]
    fn test_times_fractional_weight() {
        // 0.333 kg at $3.00/kg = $0.999 → $1.00
        let per_kg = Money::from_cents(300);
        assert_eq!(per_kg.times(Quantity::from_milli(333)).cents(), 100);
    }

    #[test]
    fn test_checked_times_rejects_overflow() {
        let huge = Money::from_cents(5_000_000_000_000_000_000);
        assert!(huge.checked_times(Quantity::from_units(2)).is_none());
        assert!((-huge).checked_times(Quantity::from_units(2)).is_none());
        assert_eq!(
            huge.checked_times(Quantity::ONE).map(|m| m.cents()),
            Some(5_000_000_000_000_000_000)
        );
    }

    #[test]
    fn test_checked_add_and_sub() {
        let max = Money::from_cents(i64::MAX);
        assert!(max.checked_add(Money::from_cents(1)).is_none());
        assert!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)).is_none());
        assert_eq!(
            Money::from_cents(250).checked_sub(Money::from_cents(400)),
            Some(Money::from_cents(-150))
        );
    }

    #[test]
    fn test_operators_saturate() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!((max + Money::from_cents(1)).cents(), i64::MAX);
        assert_eq!((-max - Money::from_cents(10)).cents(), i64::MIN);
        assert_eq!((max * 2).cents(), i64::MAX);
        assert_eq!(max.times(Quantity::from_units(3)).cents(), i64::MAX);
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(Money::from_decimal(2.5).unwrap().cents(), 250);
        assert_eq!(Money::from_decimal(19.99).unwrap().cents(), 1999);
        assert_eq!(Money::from_decimal(2.675).unwrap().cents(), 268);
        assert_eq!(Money::from_decimal(-1.5).unwrap().cents(), -150);
        assert!(Money::from_decimal(f64::NAN).is_none());
        assert!(Money::from_decimal(1e300).is_none());
    }

    #[test]
    fn test_json_shape() {
        assert_eq!(serde_json::to_string(&Money::from_cents(300)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Money::from_cents(250)).unwrap(), "2.5");
        assert_eq!(serde_json::to_string(&Money::from_cents(-5)).unwrap(), "-0.05");

        let m: Money = serde_json::from_str("150").unwrap();
        assert_eq!(m.cents(), 15_000);
        let m: Money = serde_json::from_str("0.99").unwrap();
        assert_eq!(m.cents(), 99);
        assert!(serde_json::from_str::<Money>("\"free\"").is_err());
    }

    #[test]
    fn test_decimal_adapter_option() {
        #[derive(Serialize, Deserialize)]
        struct Patch {
            #[serde(default, with = "decimal::option")]
            price: Option<i64>,
        }

        let patch: Patch = serde_json::from_str(r#"{"price": 1.25}"#).unwrap();
        assert_eq!(patch.price, Some(125));
        let patch: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.price, None);
        assert_eq!(
            serde_json::to_string(&Patch { price: Some(400) }).unwrap(),
            r#"{"price":4}"#
        );
    }

    #[test]
    fn test_sum() {
        let items = [Money::from_cents(100), Money::from_cents(250), Money::from_cents(-50)];
        let total: Money = items.iter().sum();
        assert_eq!(total.cents(), 300);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }
}
