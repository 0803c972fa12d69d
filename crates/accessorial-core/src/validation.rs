//! # Validation Module
//!
//! Input validation for pre-approval requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Types, dates, integer cents                                       │
//! │  └── Unknown family tags rejected                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Item code format, text lengths, non-negative amounts              │
//! │  └── Every problem collected into one ValidationErrors                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing handlers (crate::pricing)                            │
//! │  ├── Family-specific required fields → MissingRequiredData             │
//! │  └── Positive dimensions → InvalidDimension                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  └── NOT NULL, UNIQUE and foreign key constraints                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Single-field validators fail on the first problem with that field. The
//! request validators ([`validate_params`], [`validate_request`]) run all of
//! them and hand back the whole list.
//!
//! ## Usage
//! ```rust
//! use accessorial_core::validation::{validate_item_code, validate_params};
//! use accessorial_core::{AdditionalParams, BaseParams};
//!
//! validate_item_code("105B").unwrap();
//!
//! let base = BaseParams::new("35A");
//! validate_params(&base, &AdditionalParams::default()).unwrap();
//! ```

use crate::error::{ValidationError, ValidationErrors};
use crate::family::ResolutionRequest;
use crate::money::Money;
use crate::quantity::{FixedPointQuantity, MAX_ENCODABLE_CENTS};
use crate::types::{AdditionalParams, AddressInput, BaseParams};
use crate::{MAX_ADDRESS_FIELD_LEN, MAX_ITEM_CODE_LEN, MAX_TEXT_LEN, MAX_TIME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a tariff item code.
///
/// ## Rules
/// - Must not be empty
/// - At most `MAX_ITEM_CODE_LEN` (16) characters
/// - ASCII letters and digits only
///
/// ## Example
/// ```rust
/// use accessorial_core::validation::validate_item_code;
///
/// assert!(validate_item_code("125A").is_ok());
/// assert!(validate_item_code("").is_err());
/// assert!(validate_item_code("105 B").is_err());
/// ```
pub fn validate_item_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "item_code".to_string(),
        });
    }

    if code.len() > MAX_ITEM_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "item_code".to_string(),
            max: MAX_ITEM_CODE_LEN,
        });
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "item_code".to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(())
}

/// Validates optional free text against a length limit.
///
/// Empty text is allowed; an absent value is not this function's concern.
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates the free-text time of day ("0800-1000", "morning", ...).
pub fn validate_time(time: &str) -> ValidationResult<()> {
    validate_text("time", time, MAX_TIME_LEN)
}

fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    validate_text(field, value, max)
}

/// Validates a supplied address, collecting every field problem.
///
/// ## Rules
/// - street_address_1, city, state, postal_code required
/// - Every field at most `MAX_ADDRESS_FIELD_LEN` (200) characters
pub fn validate_address(address: &AddressInput, errors: &mut ValidationErrors) {
    let max = MAX_ADDRESS_FIELD_LEN;
    errors.check(validate_required_text(
        "address.street_address_1",
        &address.street_address_1,
        max,
    ));
    errors.check(validate_required_text("address.city", &address.city, max));
    errors.check(validate_required_text("address.state", &address.state, max));
    errors.check(validate_required_text(
        "address.postal_code",
        &address.postal_code,
        max,
    ));

    for (field, value) in [
        ("address.street_address_2", &address.street_address_2),
        ("address.street_address_3", &address.street_address_3),
        ("address.country", &address.country),
    ] {
        if let Some(value) = value {
            errors.check(validate_text(field, value, max));
        }
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a money amount.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (no-charge service)
/// - At most [`MAX_ENCODABLE_CENTS`], the largest amount quantity1 can carry
///
/// ## Example
/// ```rust
/// use accessorial_core::validation::validate_amount;
/// use accessorial_core::Money;
///
/// assert!(validate_amount("estimate_amount", Money::from_cents(0)).is_ok());
/// assert!(validate_amount("actual_amount", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() || amount.cents() > MAX_ENCODABLE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_ENCODABLE_CENTS,
        });
    }

    Ok(())
}

/// Validates a caller-supplied quantity (non-negative).
pub fn validate_quantity(field: &str, quantity: FixedPointQuantity) -> ValidationResult<()> {
    if quantity.raw() < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use accessorial_core::validation::validate_uuid;
///
/// assert!(validate_uuid("shipment_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("shipment_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

fn validate_base(base: &BaseParams, errors: &mut ValidationErrors) {
    errors.check(validate_item_code(&base.item_code));
    if let Some(quantity1) = base.quantity1 {
        errors.check(validate_quantity("quantity1", quantity1));
    }
    if let Some(quantity2) = base.quantity2 {
        errors.check(validate_quantity("quantity2", quantity2));
    }
    if let Some(notes) = &base.notes {
        errors.check(validate_text("notes", notes, MAX_TEXT_LEN));
    }
}

/// Field-level checks shared by the bag and the tagged request shapes.
#[derive(Default)]
struct Fields<'a> {
    description: Option<&'a str>,
    reason: Option<&'a str>,
    time: Option<&'a str>,
    address: Option<&'a AddressInput>,
    estimate_amount: Option<Money>,
    actual_amount: Option<Money>,
}

impl Fields<'_> {
    fn validate(&self, errors: &mut ValidationErrors) {
        if let Some(description) = self.description {
            errors.check(validate_text("description", description, MAX_TEXT_LEN));
        }
        if let Some(reason) = self.reason {
            errors.check(validate_text("reason", reason, MAX_TEXT_LEN));
        }
        if let Some(time) = self.time {
            errors.check(validate_time(time));
        }
        if let Some(address) = self.address {
            validate_address(address, errors);
        }
        if let Some(estimate) = self.estimate_amount {
            errors.check(validate_amount("estimate_amount", estimate));
        }
        if let Some(actual) = self.actual_amount {
            errors.check(validate_amount("actual_amount", actual));
        }
    }
}

/// Validates an untyped request bag, collecting every problem found.
pub fn validate_params(base: &BaseParams, params: &AdditionalParams) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    validate_base(base, &mut errors);

    Fields {
        description: params.description.as_deref(),
        reason: params.reason.as_deref(),
        time: params.time.as_deref(),
        address: params.address.as_ref(),
        estimate_amount: params.estimate_amount,
        actual_amount: params.actual_amount,
    }
    .validate(&mut errors);

    errors.into_result()
}

/// Validates an explicit request, collecting every problem found.
pub fn validate_request(
    base: &BaseParams,
    request: &ResolutionRequest,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    validate_base(base, &mut errors);

    let fields = match request {
        ResolutionRequest::DimensionedVolume(req) => Fields {
            description: req.description.as_deref(),
            ..Default::default()
        },
        ResolutionRequest::CappedCost(req) => Fields {
            description: req.description.as_deref(),
            reason: req.reason.as_deref(),
            estimate_amount: req.estimate_amount,
            actual_amount: req.actual_amount,
            ..Default::default()
        },
        ResolutionRequest::ActualCost(req) => Fields {
            description: req.description.as_deref(),
            reason: req.reason.as_deref(),
            actual_amount: req.actual_amount,
            ..Default::default()
        },
        ResolutionRequest::DatedLocationFlatRate(req) => Fields {
            reason: req.reason.as_deref(),
            time: req.time.as_deref(),
            address: req.address.as_ref(),
            ..Default::default()
        },
        ResolutionRequest::GenericManual => Fields::default(),
    };
    fields.validate(&mut errors);

    errors.into_result()
}

// =============================================================================
// Unit Tests
// =============================================================================
