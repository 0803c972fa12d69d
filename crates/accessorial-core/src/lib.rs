//! # accessorial-core: Pure Pricing Logic for Accessorial Line Items
//!
//! This crate decides how a pre-approval (accessorial) line item is priced.
//! It classifies the request into a pricing family, validates the family's
//! required data and derives the billable quantity. It has zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Accessorial Pricing Engine                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Back office (create / update request)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          accessorial-db: service, resolver, unit of work        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           ★ accessorial-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  family   │  │  pricing  │  │ cost_cap  │  │ validation│  │   │
//! │  │   │ classify  │  │ handlers  │  │ min(a, e) │  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   money   │  │ quantity  │  │   units   │                  │   │
//! │  │   │   cents   │  │ ×10,000   │  │ 1/1000 in │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOGGING                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Line items, dimensions, addresses, request parameters
//! - [`family`] - Tariff codes, pricing families, classifier, tagged requests
//! - [`pricing`] - Family handlers producing a [`pricing::ResolutionPlan`]
//! - [`cost_cap`] - Capped billing for pre-approved costs
//! - [`money`], [`quantity`], [`units`] - Integer cents, fixed-point
//!   quantities, thousandths of an inch
//! - [`validation`] - Field-level input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use accessorial_core::{pricing, AdditionalParams, BaseParams, LineItem, Money};
//! use accessorial_core::{FixedPointQuantity, ResolutionRequest, TariffCodes};
//!
//! let codes = TariffCodes::default();
//! let base = BaseParams::new("35A");
//! let params = AdditionalParams {
//!     description: Some("piano tuner".into()),
//!     reason: Some("piano".into()),
//!     estimate_amount: Some(Money::from_cents(10_000)),
//!     actual_amount: Some(Money::from_cents(15_000)),
//!     ..Default::default()
//! };
//!
//! let mut item = LineItem::new("shipment-1", "35A");
//! let request = ResolutionRequest::from_params(&codes, &base.item_code, &params);
//! pricing::resolve(&mut item, &base, &request).unwrap();
//!
//! // Billed at the $100.00 estimate, not the $150.00 actual.
//! assert_eq!(item.quantity1, FixedPointQuantity::from_cents(10_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cost_cap;
pub mod error;
pub mod family;
pub mod money;
pub mod pricing;
pub mod quantity;
pub mod types;
pub mod units;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError, ValidationErrors};
pub use family::{
    classify, ActualCostRequest, CappedCostRequest, DatedLocationRequest,
    DimensionedVolumeRequest, PricingFamily, ResolutionRequest, TariffCodes,
};
pub use money::Money;
pub use pricing::{DimensionsPlan, ResolutionPlan};
pub use quantity::FixedPointQuantity;
pub use types::*;
pub use units::ThousandthInches;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Longest accepted tariff item code.
pub const MAX_ITEM_CODE_LEN: usize = 16;

/// Limit for description, reason and notes.
pub const MAX_TEXT_LEN: usize = 1000;

/// Limit for the free-text time of day.
pub const MAX_TIME_LEN: usize = 32;

/// Limit for each address field.
pub const MAX_ADDRESS_FIELD_LEN: usize = 200;
