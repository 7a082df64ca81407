//! Exact monetary values
//!
//! This module defines the `Money` type used for every stored balance and
//! every amount flowing through the engine. Arithmetic is exact: a balance is
//! a non-negative decimal with whatever fractional precision its history
//! requires, and additions and subtractions never round.
//!
//! # Representation
//!
//! `Money` wraps a [`rust_decimal::Decimal`], i.e. a 96-bit integer mantissa
//! plus a scale. Adding `0.1` and `0.01` rescales to the larger scale and
//! yields exactly `0.11`; adding `0.1` and `0.001` yields `0.101` with all
//! three fractional digits intact. The only place precision is ever discarded
//! is [`Money::displayed`], which truncates (never rounds up) to exactly two
//! fractional digits for external reporting.

use rust_decimal::Decimal;
use std::fmt;

/// Number of fractional digits in every externally reported balance.
pub const DISPLAY_SCALE: u32 = 2;

/// An exact, non-negative monetary value.
///
/// Construction goes through [`Money::from_amount`], which rejects negative
/// inputs, so a `Money` can never hold a negative value. Arithmetic is
/// checked: [`Money::checked_add`] fails only on mantissa exhaustion, and
/// [`Money::checked_sub`] fails when the result would be negative.
///
/// Equality and ordering are numeric: `10.5`, `10.50` and `10.500` are the
/// same value regardless of how many trailing zeros their histories carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    /// The zero balance. Missing currencies read as this value.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create a `Money` from a raw decimal amount.
    ///
    /// # Returns
    ///
    /// * `Some(Money)` carrying the full precision of `amount`
    /// * `None` if `amount` is negative
    pub fn from_amount(amount: Decimal) -> Option<Self> {
        if amount.is_zero() {
            return Some(Money::ZERO);
        }
        if amount.is_sign_negative() {
            return None;
        }
        Some(Money(amount))
    }

    /// The exact inner amount, at full precision.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Exact addition.
    ///
    /// The result carries the larger fractional precision of the two
    /// operands: `0.1 + 0.001 = 0.101`, `9.99 + 0.01 = 10.00`.
    ///
    /// # Returns
    ///
    /// * `Some(Money)` with the exact sum
    /// * `None` if the sum exceeds the mantissa range
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Exact subtraction.
    ///
    /// Callers are expected to have verified `self >= other` (via [`Money::gte`]
    /// or ordering); a larger subtrahend yields `None` rather than a negative
    /// value.
    ///
    /// # Returns
    ///
    /// * `Some(Money)` with the exact difference
    /// * `None` if `other > self`
    pub fn checked_sub(&self, other: Money) -> Option<Money> {
        if other.0 > self.0 {
            return None;
        }
        self.0.checked_sub(other.0).map(Money)
    }

    /// Numeric greater-than-or-equal comparison.
    pub fn gte(&self, other: Money) -> bool {
        self.0 >= other.0
    }

    /// The externally reported form: truncated toward zero to exactly two
    /// fractional digits.
    ///
    /// Truncation, never rounding: `0.0099` reports as `0.00` and `10.999` as
    /// `10.99` - a caller must never be shown money the account does not
    /// hold. Shorter fractions are zero-padded, so `1` reports as `1.00`.
    /// This is the only operation that discards precision; the stored value
    /// is untouched.
    pub fn displayed(&self) -> Decimal {
        let mut reported = self.0.trunc_with_scale(DISPLAY_SCALE);
        reported.rescale(DISPLAY_SCALE);
        reported
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.displayed())
    }
}
