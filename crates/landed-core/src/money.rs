//! # Money Module
//!
//! Provides the `Money` type for customs values, duties and landed costs.
//!
//! ## Where Floats Are Allowed
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  product_cost ─┐                                                        │
//! │  freight      ─┼──► CIF value        INTEGER CENTS (exact sum)          │
//! │  insurance    ─┘        │                                               │
//! │                         ▼                                               │
//! │                 rate fraction × CIF   f64 (tariff rates are decimals)   │
//! │                         │                                               │
//! │                         ▼                                               │
//! │                   duty amount         INTEGER CENTS (rounded once)      │
//! │                         │                                               │
//! │                         ▼                                               │
//! │                 landed = CIF + duty   INTEGER CENTS (exact sum)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use landed_core::money::Money;
//!
//! let cost = Money::from_dollars(10_000);
//! let freight = Money::from_major_minor(500, 0);
//! let cif = cost + freight;
//! assert_eq!(cif.to_string(), "$10,500.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in US cents.
///
/// Signed so that collaborators can represent adjustments; the calculator
/// itself never produces a negative value from non-negative inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use landed_core::money::Money;
    ///
    /// let duty = Money::from_cents(13_250); // $132.50
    /// assert_eq!(duty.cents(), 13_250);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole dollars.
    #[inline]
    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    /// Creates a Money value from dollars and cents.
    ///
    /// ```rust
    /// use landed_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(5_432, 50).cents(), 543_250);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    ///
    /// For negative amounts only the major unit carries the sign.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-dollar portion (truncated toward zero).
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value as fractional dollars.
    ///
    /// Only for rate arithmetic (specific duties divide by the CIF value in
    /// dollars). Never store or sum the result.
    #[inline]
    pub fn to_dollars_f64(&self) -> f64 {
        self.0 as f64 / 100.0
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two values, or `None` if the sum does not fit in `i64` cents.
    ///
    /// ```rust
    /// use landed_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1).checked_add(Money::from_cents(2)), Some(Money::from_cents(3)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    /// ```
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplies by a dimensionless fraction and rounds to the nearest cent.
    ///
    /// This is the single rounding point of a duty calculation. Halves round
    /// away from zero, matching the `+5000 / 10000` rounding used for basis
    /// point math elsewhere.
    ///
    /// ```rust
    /// use landed_core::money::Money;
    ///
    /// let cif = Money::from_dollars(5_300);
    /// assert_eq!(cif.apply_fraction(0.025), Money::from_major_minor(132, 50));
    ///
    /// // Non-finite fractions never reach a ledger.
    /// assert_eq!(cif.apply_fraction(f64::NAN), Money::zero());
    /// ```
    pub fn apply_fraction(&self, fraction: f64) -> Money {
        let cents = self.0 as f64 * fraction;
        if !cents.is_finite() {
            return Money::zero();
        }
        Money::from_cents(cents.round() as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders `$12,345.67`, with a leading `-` for negative values.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.dollars().unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        write!(f, "{}${}.{:02}", sign, grouped, self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Saturates at the `i64` bounds. Use [`Money::checked_add`] to detect it.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Money::from_dollars(10_600).cents(), 1_060_000);
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_cents(1099).dollars(), 10);
        assert_eq!(Money::from_cents(1099).cents_part(), 99);
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_dollars(999).to_string(), "$999.00");
        assert_eq!(Money::from_dollars(1_000).to_string(), "$1,000.00");
        assert_eq!(Money::from_major_minor(12_345, 67).to_string(), "$12,345.67");
        assert_eq!(Money::from_dollars(1_234_567).to_string(), "$1,234,567.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::from_major_minor(-10_600, 0).to_string(), "-$10,600.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_dollars(10);
        let b = Money::from_dollars(5);

        assert_eq!((a + b).cents(), 1500);

        let total: Money = [a, b, Money::from_cents(1)].into_iter().sum();
        assert_eq!(total.cents(), 1501);
    }

    #[test]
    fn test_addition_saturates_instead_of_overflowing() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max + Money::from_cents(1), max);
        assert_eq!(Money::from_cents(i64::MIN) + Money::from_cents(-1), Money::from_cents(i64::MIN));

        let total: Money = [max, max, Money::from_dollars(1)].into_iter().sum();
        assert_eq!(total, max);

        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!(max.checked_add(Money::from_cents(-1)), Some(Money::from_cents(i64::MAX - 1)));
    }

    #[test]
    fn test_apply_fraction_rounds_half_away_from_zero() {
        // 1 cent × 0.5 = 0.5 cent → 1 cent
        assert_eq!(Money::from_cents(1).apply_fraction(0.5).cents(), 1);
        // 3 cents × 0.5 = 1.5 cents → 2 cents
        assert_eq!(Money::from_cents(3).apply_fraction(0.5).cents(), 2);
        assert_eq!(Money::from_cents(-3).apply_fraction(0.5).cents(), -2);
        assert_eq!(Money::from_dollars(100).apply_fraction(0.0), Money::zero());
    }

    #[test]
    fn test_apply_fraction_non_finite_is_zero() {
        let cif = Money::from_dollars(100);
        assert_eq!(cif.apply_fraction(f64::INFINITY), Money::zero());
        assert_eq!(cif.apply_fraction(f64::NAN), Money::zero());
    }

    #[test]
    fn test_to_dollars_f64() {
        assert_eq!(Money::from_dollars(10_600).to_dollars_f64(), 10_600.0);
        assert_eq!(Money::from_cents(1).to_dollars_f64(), 0.01);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_negative());

        assert!(!Money::from_cents(100).is_negative());
        assert!(Money::from_cents(-100).is_negative());
    }
}
