//! # Error Types
//!
//! Domain-specific error types for accessorial-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  accessorial-core errors (this file)                                   │
//! │  ├── CoreError         - Pricing rule violations                       │
//! │  ├── ValidationError   - A single field-level input problem            │
//! │  └── ValidationErrors  - Every field problem found in one request      │
//! │                                                                         │
//! │  accessorial-db errors (separate crate)                                │
//! │  ├── DbError           - Database operation failures                   │
//! │  └── ResolveError      - Core error | dependent write | database       │
//! │                                                                         │
//! │  Flow: ValidationErrors → CoreError → ResolveError → Caller            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (item code, field name)
//! 3. Errors are enum variants, never String
//! 4. Nothing here is retried; the caller resubmits corrected input

use std::fmt;

use thiserror::Error;

use crate::family::PricingFamily;
use crate::types::LineItemStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Pricing rule violations raised while resolving a line item.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A family-specific required field was not supplied.
    ///
    /// ## When This Occurs
    /// - CappedCost on a not-yet-approved item without description/reason/estimate
    /// - ActualCost without description/reason/actual amount
    /// - DatedLocationFlatRate without reason/date/address
    /// - GenericManual without quantity1
    ///
    /// ## User Workflow
    /// ```text
    /// Submit 226A with only a reason
    ///      │
    ///      ▼
    /// MissingRequiredData { item_code: "226A", detail: "description, actual amount" }
    ///      │
    ///      ▼
    /// Back office re-submits with the missing fields
    /// ```
    #[error("{detail} required for item code {item_code}")]
    MissingRequiredData { item_code: String, detail: String },

    /// A physical dimension is zero or negative, so no volume can be computed.
    #[error("Invalid dimension: {field} must be greater than zero, got {value}")]
    InvalidDimension { field: String, value: i64 },

    /// A status transition was attempted from a state that does not allow it.
    #[error("Cannot transition line item from {from} to {to}")]
    InvalidTransition {
        from: LineItemStatus,
        to: LineItemStatus,
    },

    /// An explicit request variant does not fit the tariff code it was sent with.
    #[error("Item code {item_code} cannot be resolved as {family}")]
    FamilyMismatch {
        item_code: String,
        family: PricingFamily,
    },

    /// An approved line item was re-resolved under another tariff code.
    #[error("Item code {item_code} is fixed once approved, cannot change to {requested}")]
    ItemCodeLocked { item_code: String, requested: String },

    /// Input validation failed (wraps every field problem found).
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

impl CoreError {
    /// Creates a MissingRequiredData error from the list of absent fields.
    pub fn missing(item_code: impl Into<String>, fields: &[&str]) -> Self {
        CoreError::MissingRequiredData {
            item_code: item_code.into(),
            detail: fields.join(", "),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet basic requirements.
/// Checked before any pricing rule runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid UUID, invalid item code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Every validation problem found in one request.
///
/// Validation does not stop at the first problem: the back office gets the
/// whole list in one round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        ValidationErrors(Vec::new())
    }

    /// Records a problem.
    pub fn push(&mut self, err: ValidationError) {
        self.0.push(err);
    }

    /// Records the error of a validator result, if any.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(err) = result {
            self.0.push(err);
        }
    }

    /// Absorbs the problems of another validation pass.
    pub fn merge(&mut self, result: Result<(), ValidationErrors>) {
        if let Err(other) = result {
            self.0.extend(other.0);
        }
    }

    /// Returns true when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded problems.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the recorded problems.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// `Ok(())` when empty, otherwise the collection as an error.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
