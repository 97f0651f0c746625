//! # Money Module
//!
//! Provides the `Money` and `Rate` types for handling monetary values and
//! percentages safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paisa                                            │
//! │    Every amount is an i64 count of the smallest currency unit.          │
//! │    Rs 10.00 / 3 = 333 paisa (×3 = 999) — the lost paisa is visible     │
//! │    and handled explicitly instead of silently drifting.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Percentages (discount, VAT) are `Rate` values in basis points:
//! 1 bps = 0.01%, so 1300 bps = 13% VAT.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paisa).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate arithmetic may dip negative; public
///   pricing entry points clamp at zero before use
/// - **Single field tuple struct**: zero-cost abstraction over i64
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paisa (the smallest currency unit).
    #[inline]
    pub const fn from_paisa(paisa: i64) -> Self {
        Money(paisa)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paisa.
    #[inline]
    pub const fn paisa(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the sub-rupee portion (always 0-99).
    #[inline]
    pub const fn paisa_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative amounts to zero.
    ///
    /// Pricing arithmetic floors every intermediate at zero so malformed
    /// input degrades to a zero contribution instead of a negative total.
    #[inline]
    pub const fn floor_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Multiplies by a quantity, clamping negative quantities to zero.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        let q = if qty < 0 { 0 } else { qty };
        Money(self.0 * q)
    }

    /// Applies a rate (e.g. VAT or discount percentage) to this amount.
    ///
    /// Uses integer math with half-up rounding:
    /// `(amount * bps + 5000) / 10000`, computed in i128 to prevent
    /// overflow on large amounts.
    pub fn apply_rate(&self, rate: Rate) -> Money {
        let out = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(out as i64)
    }
}

/// Display implementation shows money in a human-readable format.
///
/// For debugging and logs; the UI layer owns localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rs {}.{:02}", sign, self.rupees().abs(), self.paisa_part())
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

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Rate (basis points)
// =============================================================================

/// A percentage rate in basis points (1 bps = 0.01%).
///
/// Used for both the bill-level discount and VAT. 1300 bps = 13%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a float percentage supplied by an operator.
    ///
    /// Malformed input (NaN, infinite, negative) floors to zero rather
    /// than erroring; a billing total must never go negative because a
    /// discount field held garbage.
    pub fn from_percent(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return Rate(0);
        }
        Rate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paisa() {
        let money = Money::from_paisa(1099);
        assert_eq!(money.paisa(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paisa_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paisa(1099)), "Rs 10.99");
        assert_eq!(format!("{}", Money::from_paisa(500)), "Rs 5.00");
        assert_eq!(format!("{}", Money::from_paisa(-550)), "-Rs 5.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paisa(1000);
        let b = Money::from_paisa(500);
        assert_eq!((a + b).paisa(), 1500);
        assert_eq!((a - b).paisa(), 500);
    }

    #[test]
    fn test_floor_zero() {
        assert_eq!(Money::from_paisa(-250).floor_zero(), Money::zero());
        assert_eq!(Money::from_paisa(250).floor_zero().paisa(), 250);
    }

    #[test]
    fn test_multiply_quantity_clamps_negative() {
        let rate = Money::from_paisa(5000);
        assert_eq!(rate.multiply_quantity(2).paisa(), 10000);
        assert_eq!(rate.multiply_quantity(-3), Money::zero());
    }

    #[test]
    fn test_apply_rate() {
        // Rs 90.00 at 13% VAT = Rs 11.70
        let taxable = Money::from_paisa(9000);
        let vat = Rate::from_bps(1300);
        assert_eq!(taxable.apply_rate(vat).paisa(), 1170);
    }

    #[test]
    fn test_apply_rate_rounds_half_up() {
        // Rs 10.00 at 8.25% = 82.5 paisa → 83
        let amount = Money::from_paisa(1000);
        assert_eq!(amount.apply_rate(Rate::from_bps(825)).paisa(), 83);
    }

    #[test]
    fn test_rate_from_percent() {
        assert_eq!(Rate::from_percent(13.0).bps(), 1300);
        assert_eq!(Rate::from_percent(8.25).bps(), 825);
    }

    #[test]
    fn test_rate_from_percent_floors_garbage() {
        assert_eq!(Rate::from_percent(f64::NAN).bps(), 0);
        assert_eq!(Rate::from_percent(f64::INFINITY).bps(), 0);
        assert_eq!(Rate::from_percent(-10.0).bps(), 0);
    }
}
