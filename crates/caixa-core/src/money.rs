//! # Money
//!
//! Monetary values as integer centavos.
//!
//! The system this backend replaces kept currency in binary floats, and
//! a day of summed sales would drift away from what was actually in the
//! till (`0.1 + 0.2 != 0.3`). Here every amount is a whole number of
//! centavos in an `i64`, so totals, balances and reconciliations are
//! exact by construction.
//!
//! ```rust
//! use caixa_core::money::Money;
//!
//! let unit = Money::from_cents(350);            // R$ 3,50
//! let line = unit.multiply_quantity(4);         // R$ 14,00
//! assert_eq!(line.cents(), 1400);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// An amount of money in centavos.
///
/// Signed so that net results (sales minus expenses) and corrections can
/// go below zero; the places where a negative value is meaningless, like
/// a customer's outstanding balance, clamp explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole-real part of the amount.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Centavo part of the amount, 0..=99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Line subtotal: unit price times quantity.
    ///
    /// ```rust
    /// use caixa_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(299).multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Subtraction that stops at zero.
    ///
    /// Settling a customer's ledger uses this: paying off more than the
    /// recorded balance leaves the balance at zero rather than creating
    /// a phantom credit.
    #[inline]
    pub const fn saturating_sub_at_zero(&self, other: Self) -> Self {
        let result = self.0 - other.0;
        if result < 0 {
            Money(0)
        } else {
            Money(result)
        }
    }
}

/// Log-friendly rendering ("R$ 10.99"). Locale-aware formatting belongs
/// to the shell, not here.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R$ {}.{:02}", sign, self.major().abs(), self.cents_part())
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
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_split_correctly() {
        let amount = Money::from_cents(2350);
        assert_eq!(amount.cents(), 2350);
        assert_eq!(amount.major(), 23);
        assert_eq!(amount.cents_part(), 50);

        let negative = Money::from_cents(-175);
        assert_eq!(negative.major(), -1);
        assert_eq!(negative.cents_part(), 75);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(2350).to_string(), "R$ 23.50");
        assert_eq!(Money::from_cents(5).to_string(), "R$ 0.05");
        assert_eq!(Money::from_cents(-175).to_string(), "-R$ 1.75");
        assert_eq!(Money::zero().to_string(), "R$ 0.00");
    }

    #[test]
    fn test_operator_arithmetic() {
        let a = Money::from_cents(750);
        let b = Money::from_cents(250);

        assert_eq!((a + b).cents(), 1000);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((b * 4i64).cents(), 1000);

        let mut acc = Money::zero();
        acc += a;
        acc -= b;
        assert_eq!(acc.cents(), 500);
    }

    #[test]
    fn test_quantity_subtotal() {
        assert_eq!(Money::from_cents(350).multiply_quantity(4).cents(), 1400);
        assert_eq!(Money::from_cents(350).multiply_quantity(0).cents(), 0);
    }

    #[test]
    fn test_settlement_clamps_at_zero() {
        let balance = Money::from_cents(4000);
        assert_eq!(
            balance.saturating_sub_at_zero(Money::from_cents(1500)).cents(),
            2500
        );
        assert_eq!(
            balance.saturating_sub_at_zero(Money::from_cents(9000)).cents(),
            0
        );
    }

    #[test]
    fn test_sign_predicates() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::from_cents(-1).abs().cents(), 1);
        assert_eq!(Money::default(), Money::zero());
    }
}
