//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    ₱50.00 is stored as 5000, exact to the last centavo                 │
//! │                                                                         │
//! │  Costing math (quantity × unit cost) runs in full f64 precision and    │
//! │  is rounded back to centavos ONLY at the stored/displayed boundary.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kusina_core::money::Money;
//!
//! // Create from centavos (preferred)
//! let price = Money::from_cents(5000); // ₱50.00
//!
//! // Arithmetic operations
//! let total = price + Money::from_cents(2550); // ₱75.50
//!
//! // Boundary conversion, rounds half away from zero to 2 decimals
//! let rounded = Money::from_value(25.005); // ₱25.01
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in centavos (the smallest peso unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for adjustments and change math
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary value in the system flows through this type: ingredient
/// unit costs, recipe rollups, product prices, sale totals, expense amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use kusina_core::money::Money;
    ///
    /// let price = Money::from_cents(5000); // ₱50.00
    /// assert_eq!(price.cents(), 5000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal peso amount, rounding half away
    /// from zero to centavo precision.
    ///
    /// This is the boundary conversion used when a full-precision costing
    /// result is stored or displayed.
    ///
    /// ## Example
    /// ```rust
    /// use kusina_core::money::Money;
    ///
    /// assert_eq!(Money::from_value(25.0).cents(), 2500);
    /// assert_eq!(Money::from_value(33.336).cents(), 3334);
    /// assert_eq!(Money::from_value(-1.014).cents(), -101);
    /// ```
    #[inline]
    pub fn from_value(pesos: f64) -> Self {
        Money((pesos * 100.0).round() as i64)
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the decimal peso amount (2-place precision by construction).
    ///
    /// This is the representation handed across the repository API boundary.
    #[inline]
    pub fn to_value(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the major unit (pesos) portion.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (centavos) portion (always 0-99).
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

    /// Multiplies money by an integer quantity.
    ///
    /// ## Example
    /// ```rust
    /// use kusina_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(2500); // ₱25.00
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 7500); // ₱75.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies money by a fractional quantity in full precision, rounding
    /// back to centavos at the boundary.
    ///
    /// Used by recipe costing: `2.5 kg × ₱50.00/kg = ₱125.00`.
    #[inline]
    pub fn multiply_fractional(&self, qty: f64) -> Self {
        Money::from_value(self.to_value() * qty)
    }

    /// Computes a percentage of this amount, rounding to centavos.
    ///
    /// ## Example
    /// ```rust
    /// use kusina_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(10000); // ₱100.00
    /// assert_eq!(subtotal.percent_of(10.0).cents(), 1000); // ₱10.00
    /// ```
    #[inline]
    pub fn percent_of(&self, percent: f64) -> Self {
        Money::from_value(self.to_value() * percent / 100.0)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and receipts. The UI shell formats for locale itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₱{}.{:02}", sign, self.pesos().abs(), self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summation over iterators of Money (for rollups).
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
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
        let money = Money::from_cents(5099);
        assert_eq!(money.cents(), 5099);
        assert_eq!(money.pesos(), 50);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_boundary_rounding() {
        assert_eq!(Money::from_value(25.0).cents(), 2500);
        assert_eq!(Money::from_value(33.334).cents(), 3333);
        assert_eq!(Money::from_value(33.336).cents(), 3334);
        assert_eq!(Money::from_value(-1.014).cents(), -101);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(5099)), "₱50.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "₱5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-₱5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "₱0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_fractional_multiply() {
        // 2 kg of flour at ₱50.00/kg = ₱100.00
        let per_kg = Money::from_cents(5000);
        assert_eq!(per_kg.multiply_fractional(2.0).cents(), 10000);

        // 0.25 kg at ₱33.33/kg = ₱8.3325 → ₱8.33 at the boundary
        let odd = Money::from_cents(3333);
        assert_eq!(odd.multiply_fractional(0.25).cents(), 833);
    }

    #[test]
    fn test_percent_of() {
        let subtotal = Money::from_cents(10000);
        assert_eq!(subtotal.percent_of(10.0).cents(), 1000);
        assert_eq!(subtotal.percent_of(12.5).cents(), 1250);
        assert_eq!(subtotal.percent_of(0.0).cents(), 0);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 399]
            .iter()
            .map(|c| Money::from_cents(*c))
            .sum();
        assert_eq!(total.cents(), 749);
    }

    #[test]
    fn test_to_value_round_trip() {
        let money = Money::from_cents(2501);
        assert_eq!(Money::from_value(money.to_value()), money);
    }
}
