//! # Family Handlers
//!
//! Applies one [`ResolutionRequest`] to a line item: checks the family's
//! required fields, derives quantity1 and reports which dependent records
//! (dimensions, address) the persistence layer has to write.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve_explicit(codes, ..)                                            │
//! │       ├── family fits item code?          no → FamilyMismatch           │
//! │       ▼                                                                 │
//! │  resolve(&mut line_item, base, request)                                 │
//! │       ├── approved item keeps its code?   no → ItemCodeLocked           │
//! │       ├── apply base params (code, location, notes, quantity2)          │
//! │       ▼                                                                 │
//! │  ┌───────────────────┬───────────────┬─────────────┬──────────────────┐ │
//! │  │ DimensionedVolume │ CappedCost    │ ActualCost  │ DatedLocation    │ │
//! │  │ volume of crate   │ min(act, est) │ actual      │ flat 1           │ │
//! │  │ → 2 dim records   │               │             │ → 1 address      │ │
//! │  └───────────────────┴───────────────┴─────────────┴──────────────────┘ │
//! │       │                        GenericManual: quantity1 as entered      │
//! │       ▼                                                                 │
//! │  ResolutionPlan { family, dimensions, address }                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here touches the database. Every check that can fail runs before
//! the plan is handed over, so a plan never describes a write for a request
//! that is going to be rejected.

use crate::cost_cap;
use crate::error::{CoreError, CoreResult};
use crate::family::{
    ActualCostRequest, CappedCostRequest, DatedLocationRequest, DimensionedVolumeRequest,
    PricingFamily, ResolutionRequest, TariffCodes,
};
use crate::quantity::FixedPointQuantity;
use crate::types::{AddressInput, BaseParams, DimensionKind, DimensionsInput, LineItem};

/// Item and crate measurements to upsert together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionsPlan {
    pub item: DimensionsInput,
    pub crate_dimensions: DimensionsInput,
}

/// Dependent writes a resolved request requires.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionPlan {
    pub family: PricingFamily,
    pub dimensions: Option<DimensionsPlan>,
    pub address: Option<AddressInput>,
}

impl ResolutionPlan {
    fn without_writes(family: PricingFamily) -> Self {
        ResolutionPlan {
            family,
            dimensions: None,
            address: None,
        }
    }
}

/// Applies `request` to `line_item`.
///
/// The request's family is taken as given, which is what the classifier
/// path needs: [`ResolutionRequest::from_params`] already matched the code
/// against the tariff tables. Caller-chosen variants go through
/// [`resolve_explicit`] instead.
///
/// On error the line item may already carry the base parameters; callers
/// discard it together with the surrounding transaction.
pub fn resolve(
    line_item: &mut LineItem,
    base: &BaseParams,
    request: &ResolutionRequest,
) -> CoreResult<ResolutionPlan> {
    let family = request.family();
    if line_item.status.is_approved() && line_item.item_code != base.item_code {
        return Err(CoreError::ItemCodeLocked {
            item_code: line_item.item_code.clone(),
            requested: base.item_code.clone(),
        });
    }

    apply_base_params(line_item, base);

    match request {
        ResolutionRequest::DimensionedVolume(req) => {
            let dimensions = resolve_dimensioned_volume(line_item, req)?;
            Ok(ResolutionPlan {
                dimensions: Some(dimensions),
                ..ResolutionPlan::without_writes(family)
            })
        }
        ResolutionRequest::CappedCost(req) => {
            resolve_capped_cost(line_item, req)?;
            Ok(ResolutionPlan::without_writes(family))
        }
        ResolutionRequest::ActualCost(req) => {
            resolve_actual_cost(line_item, req)?;
            Ok(ResolutionPlan::without_writes(family))
        }
        ResolutionRequest::DatedLocationFlatRate(req) => {
            let address = resolve_dated_location(line_item, req)?;
            Ok(ResolutionPlan {
                address: Some(address),
                ..ResolutionPlan::without_writes(family)
            })
        }
        ResolutionRequest::GenericManual => {
            resolve_generic_manual(line_item, base)?;
            Ok(ResolutionPlan::without_writes(family))
        }
    }
}

/// [`resolve`] for a variant chosen by the caller: the item code must be
/// listed in that family's tariff table, else `FamilyMismatch`.
pub fn resolve_explicit(
    codes: &TariffCodes,
    line_item: &mut LineItem,
    base: &BaseParams,
    request: &ResolutionRequest,
) -> CoreResult<ResolutionPlan> {
    let family = request.family();
    if !codes.accepts(family, &base.item_code) {
        return Err(CoreError::FamilyMismatch {
            item_code: base.item_code.clone(),
            family,
        });
    }

    resolve(line_item, base, request)
}

/// Copies the fields every family shares. quantity1 is never taken from here.
fn apply_base_params(line_item: &mut LineItem, base: &BaseParams) {
    line_item.item_code = base.item_code.clone();
    line_item.location = base.location;
    line_item.notes = base.notes.clone();
    if let Some(quantity2) = base.quantity2 {
        line_item.quantity2 = quantity2;
    }
}

fn resolve_dimensioned_volume(
    line_item: &mut LineItem,
    req: &DimensionedVolumeRequest,
) -> CoreResult<DimensionsPlan> {
    let (Some(item), Some(crate_dimensions)) = (req.item_dimensions, req.crate_dimensions) else {
        return Err(CoreError::missing(
            &line_item.item_code,
            &["item and crate dimensions"],
        ));
    };

    item.ensure_positive(DimensionKind::Item)?;
    crate_dimensions.ensure_positive(DimensionKind::Crate)?;

    line_item.quantity1 = FixedPointQuantity::from_float(crate_dimensions.cubic_feet());
    line_item.description = req.description.clone();

    Ok(DimensionsPlan {
        item,
        crate_dimensions,
    })
}

fn resolve_capped_cost(line_item: &mut LineItem, req: &CappedCostRequest) -> CoreResult<()> {
    // After approval the cap is frozen; only the actual cost moves.
    if line_item.status.is_approved() {
        if req.actual_amount.is_some() {
            line_item.actual_amount = req.actual_amount;
        }
        let estimate = line_item
            .estimate_amount
            .ok_or_else(|| CoreError::missing(&line_item.item_code, &["estimate amount"]))?;
        line_item.quantity1 = cost_cap::billable_quantity(estimate, line_item.actual_amount);
        return Ok(());
    }

    let mut missing = Vec::new();
    if req.description.is_none() {
        missing.push("description");
    }
    if req.reason.is_none() {
        missing.push("reason");
    }
    if req.estimate_amount.is_none() {
        missing.push("estimate amount");
    }
    let Some(estimate) = req.estimate_amount.filter(|_| missing.is_empty()) else {
        return Err(CoreError::missing(&line_item.item_code, &missing));
    };

    line_item.description = req.description.clone();
    line_item.reason = req.reason.clone();
    line_item.estimate_amount = Some(estimate);
    line_item.actual_amount = req.actual_amount;
    line_item.quantity1 = cost_cap::billable_quantity(estimate, req.actual_amount);
    Ok(())
}

fn resolve_actual_cost(line_item: &mut LineItem, req: &ActualCostRequest) -> CoreResult<()> {
    let mut missing = Vec::new();
    if req.description.is_none() {
        missing.push("description");
    }
    if req.reason.is_none() {
        missing.push("reason");
    }
    if req.actual_amount.is_none() {
        missing.push("actual amount");
    }
    let Some(actual) = req.actual_amount.filter(|_| missing.is_empty()) else {
        return Err(CoreError::missing(&line_item.item_code, &missing));
    };

    line_item.description = req.description.clone();
    line_item.reason = req.reason.clone();
    line_item.actual_amount = Some(actual);
    line_item.quantity1 = FixedPointQuantity::from_money(actual);
    Ok(())
}

fn resolve_dated_location(
    line_item: &mut LineItem,
    req: &DatedLocationRequest,
) -> CoreResult<AddressInput> {
    let mut missing = Vec::new();
    if req.reason.is_none() {
        missing.push("reason");
    }
    if req.date.is_none() {
        missing.push("date");
    }
    if req.address.is_none() {
        missing.push("address");
    }
    let (Some(date), Some(address), true) = (req.date, req.address.clone(), missing.is_empty())
    else {
        return Err(CoreError::missing(&line_item.item_code, &missing));
    };

    line_item.reason = req.reason.clone();
    line_item.date = Some(date);
    line_item.time = req.time.clone();
    line_item.quantity1 = FixedPointQuantity::from_int(1);
    Ok(address)
}

fn resolve_generic_manual(line_item: &mut LineItem, base: &BaseParams) -> CoreResult<()> {
    let quantity1 = base
        .quantity1
        .ok_or_else(|| CoreError::missing(&line_item.item_code, &["Quantity1"]))?;
    line_item.quantity1 = quantity1;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
