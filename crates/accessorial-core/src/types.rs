//! # Domain Types
//!
//! Core domain types for pre-approval (accessorial) line items.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐      owns 0..1   ┌─────────────────────┐      │
//! │  │      LineItem       │─────────────────►│  Dimensions (item)  │      │
//! │  │  ─────────────────  │      owns 0..1   ├─────────────────────┤      │
//! │  │  id (UUID)          │─────────────────►│  Dimensions (crate) │      │
//! │  │  shipment_id        │                  └─────────────────────┘      │
//! │  │  item_code          │      owns 0..1   ┌─────────────────────┐      │
//! │  │  quantity1/2        │─────────────────►│      Address        │      │
//! │  │  status             │                  └─────────────────────┘      │
//! │  │  estimate / actual  │                                               │
//! │  └─────────────────────┘                                               │
//! │                                                                         │
//! │  Request side:  BaseParams + AdditionalParams (every field optional)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! Dimension and address records are never shared between line items. They are
//! created the first time a line item needs them and updated in place after
//! that; the record id never changes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::FixedPointQuantity;
use crate::units::{self, ThousandthInches};

// =============================================================================
// Line Item Status
// =============================================================================

/// Approval status of a line item.
///
/// ## State Machine
/// ```text
/// Submitted ──approve()──► Approved ──(invoicing)──► Invoiced
///     ▲                                                  │
///  initial                                           terminal
/// ```
/// Only `approve()` is defined here; invoicing happens elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LineItemStatus {
    /// Requested, waiting for approval.
    #[default]
    Submitted,
    /// Approved for billing.
    Approved,
    /// Billed on an invoice.
    Invoiced,
}

impl LineItemStatus {
    /// Transition Submitted → Approved.
    pub fn approve(self) -> CoreResult<Self> {
        match self {
            LineItemStatus::Submitted => Ok(LineItemStatus::Approved),
            from => Err(CoreError::InvalidTransition {
                from,
                to: LineItemStatus::Approved,
            }),
        }
    }

    /// True once the item has been approved (approved or invoiced).
    pub fn is_approved(&self) -> bool {
        matches!(self, LineItemStatus::Approved | LineItemStatus::Invoiced)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineItemStatus::Submitted => "submitted",
            LineItemStatus::Approved => "approved",
            LineItemStatus::Invoiced => "invoiced",
        }
    }
}

impl fmt::Display for LineItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Location
// =============================================================================

/// Where on the shipment the service is performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemLocation {
    Origin,
    Destination,
    #[default]
    Neither,
}

// =============================================================================
// Dimensions
// =============================================================================

/// Which dimension slot of a line item a record fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    /// The item being crated.
    Item,
    /// The crate built around it (billed by volume).
    Crate,
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionKind::Item => f.write_str("item"),
            DimensionKind::Crate => f.write_str("crate"),
        }
    }
}

/// Length × width × height as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DimensionsInput {
    pub length: ThousandthInches,
    pub width: ThousandthInches,
    pub height: ThousandthInches,
}

impl DimensionsInput {
    pub const fn new(length: ThousandthInches, width: ThousandthInches, height: ThousandthInches) -> Self {
        DimensionsInput {
            length,
            width,
            height,
        }
    }

    /// Fails with `InvalidDimension` naming the first non-positive side.
    pub fn ensure_positive(&self, kind: DimensionKind) -> CoreResult<()> {
        for (side, value) in [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
        ] {
            if !value.is_positive() {
                return Err(CoreError::InvalidDimension {
                    field: format!("{} {}", kind, side),
                    value: value.value() as i64,
                });
            }
        }
        Ok(())
    }

    /// Enclosed volume in cubic feet.
    pub fn cubic_feet(&self) -> f64 {
        units::cubic_feet(self.length, self.width, self.height)
    }
}

/// A persisted dimension record owned by one line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dimensions {
    pub id: String,
    pub kind: DimensionKind,
    pub length: ThousandthInches,
    pub width: ThousandthInches,
    pub height: ThousandthInches,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Dimensions {
    /// Builds a new record (fresh id) from caller input.
    pub fn from_input(kind: DimensionKind, input: &DimensionsInput, now: DateTime<Utc>) -> Self {
        Dimensions {
            id: Uuid::new_v4().to_string(),
            kind,
            length: input.length,
            width: input.width,
            height: input.height,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the measurements, keeping id and kind.
    pub fn apply(&mut self, input: &DimensionsInput, now: DateTime<Utc>) {
        self.length = input.length;
        self.width = input.width;
        self.height = input.height;
        self.updated_at = now;
    }

    pub fn as_input(&self) -> DimensionsInput {
        DimensionsInput::new(self.length, self.width, self.height)
    }
}

// =============================================================================
// Address
// =============================================================================

/// Address fields as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddressInput {
    pub street_address_1: String,
    #[serde(default)]
    pub street_address_2: Option<String>,
    #[serde(default)]
    pub street_address_3: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub country: Option<String>,
}

/// A persisted address owned by exactly one line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Address {
    pub id: String,
    pub street_address_1: String,
    pub street_address_2: Option<String>,
    pub street_address_3: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// Builds a new record (fresh id) from caller input.
    pub fn from_input(input: &AddressInput, now: DateTime<Utc>) -> Self {
        Address {
            id: Uuid::new_v4().to_string(),
            street_address_1: input.street_address_1.clone(),
            street_address_2: input.street_address_2.clone(),
            street_address_3: input.street_address_3.clone(),
            city: input.city.clone(),
            state: input.state.clone(),
            postal_code: input.postal_code.clone(),
            country: input.country.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites every field in place, keeping the id.
    pub fn apply(&mut self, input: &AddressInput, now: DateTime<Utc>) {
        self.street_address_1 = input.street_address_1.clone();
        self.street_address_2 = input.street_address_2.clone();
        self.street_address_3 = input.street_address_3.clone();
        self.city = input.city.clone();
        self.state = input.state.clone();
        self.postal_code = input.postal_code.clone();
        self.country = input.country.clone();
        self.updated_at = now;
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A requested accessorial service charge attached to one shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Shipment this charge belongs to.
    pub shipment_id: String,

    /// Tariff item code, e.g. "105B", "35A", "125A".
    pub item_code: String,

    /// Billable base quantity. Derived for every family except GenericManual.
    pub quantity1: FixedPointQuantity,

    /// Secondary quantity, passed through from the caller.
    pub quantity2: FixedPointQuantity,

    pub location: ItemLocation,
    pub notes: Option<String>,
    pub status: LineItemStatus,

    pub description: Option<String>,
    pub reason: Option<String>,

    /// Service date (dated-location family).
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,

    /// Free-text time of day, e.g. "0800-1000".
    pub time: Option<String>,

    /// Approved cap for cost-based items, in cents.
    pub estimate_amount: Option<Money>,

    /// Actual cost incurred, in cents.
    pub actual_amount: Option<Money>,

    pub item_dimensions: Option<Dimensions>,
    pub crate_dimensions: Option<Dimensions>,
    pub address: Option<Address>,

    #[ts(as = "String")]
    pub submitted_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub approved_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl LineItem {
    /// A fresh, submitted line item with no derived data yet.
    pub fn new(shipment_id: impl Into<String>, item_code: impl Into<String>) -> Self {
        let now = Utc::now();
        LineItem {
            id: Uuid::new_v4().to_string(),
            shipment_id: shipment_id.into(),
            item_code: item_code.into(),
            quantity1: FixedPointQuantity::zero(),
            quantity2: FixedPointQuantity::zero(),
            location: ItemLocation::default(),
            notes: None,
            status: LineItemStatus::Submitted,
            description: None,
            reason: None,
            date: None,
            time: None,
            estimate_amount: None,
            actual_amount: None,
            item_dimensions: None,
            crate_dimensions: None,
            address: None,
            submitted_at: now,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Approves the line item (Submitted → Approved).
    pub fn approve(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.status = self.status.approve()?;
        self.approved_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Parameters every pre-approval request carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BaseParams {
    pub item_code: String,
    /// Only honored by the GenericManual family.
    #[serde(default)]
    pub quantity1: Option<FixedPointQuantity>,
    #[serde(default)]
    pub quantity2: Option<FixedPointQuantity>,
    #[serde(default)]
    pub location: ItemLocation,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BaseParams {
    pub fn new(item_code: impl Into<String>) -> Self {
        BaseParams {
            item_code: item_code.into(),
            quantity1: None,
            quantity2: None,
            location: ItemLocation::default(),
            notes: None,
        }
    }
}

/// The optional, family-specific bag of request fields.
///
/// Which fields are present decides the pricing family (see [`crate::family`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct AdditionalParams {
    pub description: Option<String>,
    pub reason: Option<String>,
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub address: Option<AddressInput>,
    pub item_dimensions: Option<DimensionsInput>,
    pub crate_dimensions: Option<DimensionsInput>,
    pub estimate_amount: Option<Money>,
    pub actual_amount: Option<Money>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default() {
        assert_eq!(LineItemStatus::default(), LineItemStatus::Submitted);
    }

    #[test]
    fn test_approve_only_from_submitted() {
        assert_eq!(
            LineItemStatus::Submitted.approve().unwrap(),
            LineItemStatus::Approved
        );
        assert!(matches!(
            LineItemStatus::Approved.approve(),
            Err(CoreError::InvalidTransition {
                from: LineItemStatus::Approved,
                to: LineItemStatus::Approved
            })
        ));
        assert!(matches!(
            LineItemStatus::Invoiced.approve(),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_line_item_approve_sets_timestamp() {
        let mut item = LineItem::new("shipment-1", "35A");
        let now = Utc::now();
        item.approve(now).unwrap();
        assert_eq!(item.status, LineItemStatus::Approved);
        assert_eq!(item.approved_at, Some(now));

        assert!(item.approve(Utc::now()).is_err());
        assert_eq!(item.approved_at, Some(now));
    }

    #[test]
    fn test_dimensions_ensure_positive() {
        let inch = ThousandthInches::from_inches(1);
        let ok = DimensionsInput::new(inch, inch, inch);
        assert!(ok.ensure_positive(DimensionKind::Crate).is_ok());

        let flat = DimensionsInput::new(inch, ThousandthInches::new(0), inch);
        match flat.ensure_positive(DimensionKind::Crate) {
            Err(CoreError::InvalidDimension { field, value }) => {
                assert_eq!(field, "crate width");
                assert_eq!(value, 0);
            }
            other => panic!("expected InvalidDimension, got {:?}", other),
        }
    }

    #[test]
    fn test_dimensions_apply_keeps_identity() {
        let inch = ThousandthInches::from_inches(1);
        let created = Utc::now();
        let mut dims =
            Dimensions::from_input(DimensionKind::Item, &DimensionsInput::new(inch, inch, inch), created);
        let id = dims.id.clone();

        let foot = ThousandthInches::from_inches(12);
        dims.apply(&DimensionsInput::new(foot, foot, foot), Utc::now());

        assert_eq!(dims.id, id);
        assert_eq!(dims.kind, DimensionKind::Item);
        assert_eq!(dims.length, foot);
        assert_eq!(dims.created_at, created);
    }

    #[test]
    fn test_additional_params_from_sparse_json() {
        let params: AdditionalParams = serde_json::from_str(
            r#"{ "reason": "stairs", "date": "2026-03-01", "actual_amount": 5000 }"#,
        )
        .unwrap();
        assert_eq!(params.reason.as_deref(), Some("stairs"));
        assert_eq!(params.date, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(params.actual_amount, Some(Money::from_cents(5000)));
        assert!(params.address.is_none());
    }
}
