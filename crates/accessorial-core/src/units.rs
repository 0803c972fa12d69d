//! # Unit Conversions
//!
//! Physical lengths arrive in thousandths of an inch; crating is billed in
//! cubic feet.
//!
//! ```text
//! 1 foot = 12 inches = 12,000 thousandths of an inch
//! 1 cubic foot = 12,000³ cubic thousandths = 1.728 × 10¹²
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Thousandths of an inch in one foot.
pub const THOUSANDTHS_PER_FOOT: f64 = 12_000.0;

/// A length in thousandths of an inch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct ThousandthInches(i32);

impl ThousandthInches {
    #[inline]
    pub const fn new(value: i32) -> Self {
        ThousandthInches(value)
    }

    /// Whole inches, e.g. `from_inches(12)` is one foot.
    #[inline]
    pub const fn from_inches(inches: i32) -> Self {
        ThousandthInches(inches * 1000)
    }

    #[inline]
    pub const fn value(&self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Converts to feet.
    #[inline]
    pub fn to_feet(&self) -> f64 {
        self.0 as f64 / THOUSANDTHS_PER_FOOT
    }
}

impl fmt::Display for ThousandthInches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/1000 in", self.0)
    }
}

/// Volume in cubic feet of a box given in thousandths of an inch.
pub fn cubic_feet(length: ThousandthInches, width: ThousandthInches, height: ThousandthInches) -> f64 {
    length.to_feet() * width.to_feet() * height.to_feet()
}
