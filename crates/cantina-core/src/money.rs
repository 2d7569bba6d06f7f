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
//! │  A 16% IVA on $220.00 computed as 220 * 0.16 = 35.2 happens to print   │
//! │  nicely, but 3 × $33.33 + IVA drifts by fractions of a centavo that    │
//! │  later show up as a cash drawer difference.                            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer centavos, rounded once per operation            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Money` value does not carry its currency. Everything stored on an
//! order is in the base currency (MXN); USD amounts only appear at the
//! payment boundary and are converted with [`crate::currency::convert_currency`].
//!
//! ## Usage
//! ```rust
//! use cantina_core::money::Money;
//!
//! let price = Money::from_cents(18050); // $180.50
//! let doubled = price * 2;              // $361.00
//! let total = price + Money::from_major(25); // $205.50
//! assert_eq!(total.cents(), 20550);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centavos for MXN).
///
/// ## Design Decisions
/// - **i64 (signed)**: expenses and withdrawals are stored negative in the
///   cash ledger, closure differences can be negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Product.price_pesos ──► OrderLineItem.price ──► line subtotal          │
/// │                                                                         │
/// │  subtotal ──► tax ──► total ──► − discount + tip ──► final total        │
/// │                                                                         │
/// │  final total ──► CashMovement(sale) ──► CashSummary ──► CashClosure     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use cantina_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole pesos (or dollars).
    ///
    /// ## Example
    /// ```rust
    /// use cantina_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(180).cents(), 18000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use cantina_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99);
    /// assert_eq!(price.cents(), 1099);
    ///
    /// let negative = Money::from_major_minor(-5, 50);
    /// assert_eq!(negative.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (pesos) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
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
    ///
    /// ## Example
    /// ```rust
    /// use cantina_core::money::Money;
    ///
    /// let expense = Money::from_cents(-5000);
    /// assert_eq!(expense.abs().cents(), 5000);
    /// ```
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax, rounding half away from zero to the centavo.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps ± 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use cantina_core::money::Money;
    /// use cantina_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_major(220);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(1600));
    /// assert_eq!(tax.cents(), 3520); // $35.20
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Order subtotal: $220.00
    ///      │
    ///      ▼
    /// calculate_tax(16%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// IVA: $35.20  →  Total: $255.20
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.scale(rate.bps() as i64, 10_000)
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use cantina_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(4500);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 13500);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns `bps` basis points of this amount (1000 bps = 10%).
    ///
    /// There is no upper clamp: 15000 bps yields one and a half times the
    /// amount.
    ///
    /// ## Example
    /// ```rust
    /// use cantina_core::money::Money;
    ///
    /// let total = Money::from_major(100);
    /// assert_eq!(total.percentage(1000), Money::from_major(10));
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        self.scale(bps as i64, 10_000)
    }

    /// Computes `self * numerator / denominator`, rounding half away from
    /// zero. Uses i128 so large amounts cannot overflow mid-calculation.
    ///
    /// `denominator` must be positive. Results beyond `i64` saturate.
    pub fn scale(&self, numerator: i64, denominator: i64) -> Money {
        let product = self.0 as i128 * numerator as i128;
        let den = denominator as i128;
        let half = den / 2;
        let rounded = if product >= 0 {
            (product + half) / den
        } else {
            (product - half) / den
        };
        Money(i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$1234.50`, `-$5.50`.
///
/// ## Note
/// No currency suffix or thousands separator; the UI formats for display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.cents_part())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
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
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
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
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-a).cents(), -1000);
        assert_eq!(a.min(b), b);
    }

    #[test]
    fn test_sum() {
        let amounts = vec![Money::from_cents(100), Money::from_cents(250)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.cents(), 350);
        let total: Money = amounts.into_iter().sum();
        assert_eq!(total.cents(), 350);
    }

    #[test]
    fn test_tax_sixteen_percent() {
        let tax = Money::from_major(220).calculate_tax(TaxRate::from_bps(1600));
        assert_eq!(tax.cents(), 3520);
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // $0.03 at 16% = 0.48 centavos → 0; $0.05 at 10% = 0.5 → 1
        assert_eq!(Money::from_cents(3).calculate_tax(TaxRate::from_bps(1600)).cents(), 0);
        assert_eq!(Money::from_cents(5).calculate_tax(TaxRate::from_bps(1000)).cents(), 1);
    }

    #[test]
    fn test_scale_negative_rounds_away_from_zero() {
        assert_eq!(Money::from_cents(-5).scale(1, 10).cents(), -1);
        assert_eq!(Money::from_cents(-4).scale(1, 10).cents(), 0);
    }

    #[test]
    fn test_percentage_is_not_clamped() {
        let total = Money::from_major(100);
        assert_eq!(total.percentage(1000).cents(), 1000);
        assert_eq!(total.percentage(15000).cents(), 15000);
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

    #[test]
    fn test_multiply_and_scale_saturate() {
        assert_eq!(Money::from_cents(i64::MAX / 2).multiply_quantity(3).cents(), i64::MAX);
        assert_eq!(Money::from_cents(i64::MIN / 2).multiply_quantity(3).cents(), i64::MIN);
        assert_eq!(Money::from_cents(i64::MAX).scale(3, 1).cents(), i64::MAX);
        assert_eq!(Money::from_cents(i64::MIN).scale(3, 1).cents(), i64::MIN);
    }

    /// Splitting $10.00 three ways loses a centavo; the loss is explicit.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten = Money::from_cents(1000);
        let one_third = Money::from_cents(1000 / 3);
        let reconstructed = one_third * 3;
        assert_eq!(reconstructed.cents(), 999);
        assert_eq!((ten - reconstructed).cents(), 1);
    }
}
