//! # Fixed-Point Quantity
//!
//! Billing quantities (cubic feet, dollar amounts, flat-rate unit counts) are
//! stored as integers scaled by 10,000.
//!
//! ## Encoding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  decimal quantity          raw value (× 10,000)                         │
//! │  ─────────────────         ────────────────────                         │
//! │  1 (flat rate)             10000                                        │
//! │  $100.00 (10000 cents)     1000000                                      │
//! │  4.6296 cubic feet         46296                                        │
//! │                                                                         │
//! │  cents → quantity is exact:  raw = cents × 100                          │
//! │  float → quantity rounds:    raw = round(value × 10000)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;

/// Number of raw units in one whole quantity.
pub const QUANTITY_SCALE: i64 = 10_000;

/// Raw units per cent.
const RAW_PER_CENT: i64 = QUANTITY_SCALE / 100;

/// Largest amount in cents whose dollar quantity still fits the encoding.
pub const MAX_ENCODABLE_CENTS: i64 = i64::MAX / RAW_PER_CENT;

/// Number of fractional decimal digits carried by the encoding.
const SCALE_DIGITS: usize = 4;

/// A decimal quantity encoded as an integer scaled by 10,000.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct FixedPointQuantity(i64);

impl FixedPointQuantity {
    /// Wraps an already-encoded raw value.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        FixedPointQuantity(raw)
    }

    /// Returns the encoded raw value (what gets persisted).
    #[inline]
    pub const fn raw(&self) -> i64 {
        self.0
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        FixedPointQuantity(0)
    }

    /// Encodes a whole count, e.g. `from_int(1)` for a flat-rate multiplier.
    #[inline]
    pub const fn from_int(count: i64) -> Self {
        FixedPointQuantity(count * QUANTITY_SCALE)
    }

    /// Encodes a floating value, rounding half away from zero to the nearest
    /// ten-thousandth.
    ///
    /// ## Example
    /// ```rust
    /// use accessorial_core::quantity::FixedPointQuantity;
    ///
    /// assert_eq!(FixedPointQuantity::from_float(1.23456).raw(), 12346);
    /// ```
    pub fn from_float(value: f64) -> Self {
        FixedPointQuantity((value * QUANTITY_SCALE as f64).round() as i64)
    }

    /// Encodes a monetary amount as a dollar quantity.
    ///
    /// One cent is 0.01 dollars, i.e. 100 raw units, so this never rounds.
    /// Amounts beyond [`MAX_ENCODABLE_CENTS`] saturate.
    #[inline]
    pub const fn from_money(amount: Money) -> Self {
        FixedPointQuantity(amount.cents().saturating_mul(RAW_PER_CENT))
    }

    /// Shorthand for `from_money(Money::from_cents(cents))`.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Self::from_money(Money::from_cents(cents))
    }

    /// Decodes to a float (for display and reporting only).
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / QUANTITY_SCALE as f64
    }
}

impl fmt::Display for FixedPointQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = QUANTITY_SCALE as u64;
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            abs / scale,
            abs % scale,
            width = SCALE_DIGITS
        )
    }
}

/// Failure to decode a decimal string into a fixed-point quantity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseQuantityError {
    #[error("quantity is empty")]
    Empty,
    #[error("quantity '{0}' is not a decimal number")]
    NotANumber(String),
    #[error("quantity '{0}' has more than 4 decimal places")]
    TooPrecise(String),
    #[error("quantity '{0}' is out of range")]
    OutOfRange(String),
}

impl FromStr for FixedPointQuantity {
    type Err = ParseQuantityError;

    /// Decodes "12", "12.5" or "-0.0001" exactly, without going through a float.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseQuantityError::Empty);
        }

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(ParseQuantityError::NotANumber(s.to_string()));
        }
        if frac.len() > SCALE_DIGITS {
            return Err(ParseQuantityError::TooPrecise(s.to_string()));
        }

        let out_of_range = || ParseQuantityError::OutOfRange(s.to_string());
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| out_of_range())?
        };
        let frac: i64 = if frac.is_empty() {
            0
        } else {
            format!("{:0<width$}", frac, width = SCALE_DIGITS)
                .parse()
                .map_err(|_| out_of_range())?
        };

        let raw = whole
            .checked_mul(QUANTITY_SCALE)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(out_of_range)?;

        Ok(FixedPointQuantity(if negative { -raw } else { raw }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_int() {
        assert_eq!(FixedPointQuantity::from_int(1).raw(), 10_000);
        assert_eq!(FixedPointQuantity::from_int(0), FixedPointQuantity::zero());
    }

    #[test]
    fn test_from_float_rounds() {
        assert_eq!(FixedPointQuantity::from_float(1.0).raw(), 10_000);
        assert_eq!(FixedPointQuantity::from_float(4.62962).raw(), 46_296);
        assert_eq!(FixedPointQuantity::from_float(0.00005).raw(), 1);
        assert_eq!(FixedPointQuantity::from_float(0.0000499).raw(), 0);
        assert_eq!(FixedPointQuantity::from_raw(24_300).to_f64(), 2.43);
    }

    #[test]
    fn test_from_money_at_encoding_limit() {
        let max = FixedPointQuantity::from_cents(MAX_ENCODABLE_CENTS);
        assert_eq!(max.raw(), MAX_ENCODABLE_CENTS * 100);
        assert_eq!(FixedPointQuantity::from_cents(i64::MAX).raw(), i64::MAX);
        assert_eq!(FixedPointQuantity::from_cents(i64::MIN).raw(), i64::MIN);
    }

    #[test]
    fn test_from_money_is_exact() {
        // $100.00 → 100.0000
        assert_eq!(FixedPointQuantity::from_cents(10_000).raw(), 1_000_000);
        // $0.01 → 0.0100
        assert_eq!(FixedPointQuantity::from_money(Money::from_cents(1)).raw(), 100);
        assert_eq!(FixedPointQuantity::from_cents(0), FixedPointQuantity::zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(FixedPointQuantity::from_int(1).to_string(), "1.0000");
        assert_eq!(FixedPointQuantity::from_raw(46_296).to_string(), "4.6296");
        assert_eq!(FixedPointQuantity::from_raw(-5).to_string(), "-0.0005");
        assert_eq!(FixedPointQuantity::from_cents(5000).to_string(), "50.0000");
    }

    #[test]
    fn test_parse() {
        assert_eq!("12".parse::<FixedPointQuantity>().unwrap().raw(), 120_000);
        assert_eq!("12.5".parse::<FixedPointQuantity>().unwrap().raw(), 125_000);
        assert_eq!(".25".parse::<FixedPointQuantity>().unwrap().raw(), 2_500);
        assert_eq!("-0.0001".parse::<FixedPointQuantity>().unwrap().raw(), -1);
        assert_eq!(" 3.0000 ".parse::<FixedPointQuantity>().unwrap().raw(), 30_000);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("".parse::<FixedPointQuantity>(), Err(ParseQuantityError::Empty));
        assert!(matches!(
            "1.23456".parse::<FixedPointQuantity>(),
            Err(ParseQuantityError::TooPrecise(_))
        ));
        assert!(matches!(
            "abc".parse::<FixedPointQuantity>(),
            Err(ParseQuantityError::NotANumber(_))
        ));
        assert!(matches!(
            ".".parse::<FixedPointQuantity>(),
            Err(ParseQuantityError::NotANumber(_))
        ));
        assert!(matches!(
            "99999999999999999999".parse::<FixedPointQuantity>(),
            Err(ParseQuantityError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_display_parse_agree() {
        let q = FixedPointQuantity::from_raw(1_234_567);
        assert_eq!(q.to_string().parse::<FixedPointQuantity>().unwrap(), q);
    }
}
