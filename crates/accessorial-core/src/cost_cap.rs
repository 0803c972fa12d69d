//! # Cost Cap
//!
//! A pre-approved cost item bills the actual cost, but never more than the
//! approved estimate.
//!
//! ```text
//! estimate $100.00   actual $150.00   → bill $100.00
//! estimate $100.00   actual  $80.00   → bill  $80.00
//! estimate $100.00   actual  (none)   → bill   $0.00
//! ```

use crate::money::Money;
use crate::quantity::FixedPointQuantity;

/// The billable amount: `min(actual, estimate)`, or zero before any actual
/// cost is known.
pub fn capped_amount(estimate: Money, actual: Option<Money>) -> Money {
    actual.map_or(Money::zero(), |actual| actual.min(estimate))
}

/// [`capped_amount`] encoded as a dollar quantity.
pub fn billable_quantity(estimate: Money, actual: Option<Money>) -> FixedPointQuantity {
    FixedPointQuantity::from_money(capped_amount(estimate, actual))
}
