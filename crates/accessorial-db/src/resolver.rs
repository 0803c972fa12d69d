//! # Dependency Resolver
//!
//! Runs the pricing handlers against a line item and writes the dependent
//! records they ask for, all inside the caller's unit of work.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve(uow, base, additional, &mut line_item)                         │
//! │       │                                                                 │
//! │       ├── ResolutionRequest::from_params (classifier, first match wins) │
//! │       └── pricing::resolve → quantity1 + ResolutionPlan                 │
//! │                                                                         │
//! │  resolve_request(uow, base, request, &mut line_item)                    │
//! │       └── pricing::resolve_explicit → code must be in the family table  │
//! │                                                                         │
//! │  Both, once every check has passed:                                     │
//! │       │                                                                 │
//! │       ├── plan.dimensions → upsert item dims, upsert crate dims        │
//! │       └── plan.address    → upsert address                             │
//! │                                                                         │
//! │  Upsert = update the record already linked to the line item, or        │
//! │  insert a new one and link it. Ids never change once assigned.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The resolver does not write the line item itself or commit; the service
//! does both after a successful resolution.

use chrono::Utc;
use tracing::{debug, error, instrument, warn};

use crate::error::{DbResult, DependentRecord, ResolveError, ResolveResult};
use crate::unit_of_work::UnitOfWork;
use accessorial_core::pricing;
use accessorial_core::{
    AdditionalParams, Address, AddressInput, BaseParams, DimensionKind, Dimensions,
    DimensionsInput, LineItem, PricingFamily, ResolutionPlan, ResolutionRequest, TariffCodes,
};

/// Resolves line-item dependencies for one set of tariff codes.
#[derive(Debug, Clone, Default)]
pub struct DependencyResolver {
    codes: TariffCodes,
}

impl DependencyResolver {
    pub fn new(codes: TariffCodes) -> Self {
        DependencyResolver { codes }
    }

    pub fn codes(&self) -> &TariffCodes {
        &self.codes
    }

    /// Resolves an untyped request bag.
    ///
    /// The family is inferred from the item code and the supplied fields. A
    /// specialized code that arrives without its trigger fields is priced
    /// manually; that fall-through is logged at `warn`.
    #[instrument(skip_all, fields(line_item_id = %line_item.id, item_code = %base.item_code))]
    pub async fn resolve(
        &self,
        uow: &mut UnitOfWork,
        base: &BaseParams,
        additional: &AdditionalParams,
        line_item: &mut LineItem,
    ) -> ResolveResult<PricingFamily> {
        let request = ResolutionRequest::from_params(&self.codes, &base.item_code, additional);

        if request.family() == PricingFamily::GenericManual {
            if let Some(expected) = self.codes.family_for_code(&base.item_code) {
                warn!(
                    expected = %expected,
                    "Item code has a specialized family but none of its fields were supplied; pricing manually"
                );
            }
        }

        let plan = pricing::resolve(line_item, base, &request)?;
        write_dependents(uow, line_item, plan).await
    }

    /// Resolves a request whose family was chosen by the caller.
    #[instrument(
        skip_all,
        fields(line_item_id = %line_item.id, item_code = %base.item_code, family = %request.family())
    )]
    pub async fn resolve_request(
        &self,
        uow: &mut UnitOfWork,
        base: &BaseParams,
        request: &ResolutionRequest,
        line_item: &mut LineItem,
    ) -> ResolveResult<PricingFamily> {
        let plan = pricing::resolve_explicit(&self.codes, line_item, base, request)?;
        write_dependents(uow, line_item, plan).await
    }
}

/// Executes the plan's upserts against the unit of work.
async fn write_dependents(
    uow: &mut UnitOfWork,
    line_item: &mut LineItem,
    plan: ResolutionPlan,
) -> ResolveResult<PricingFamily> {
    if let Some(dimensions) = &plan.dimensions {
        upsert_dimensions(
            uow,
            &mut line_item.item_dimensions,
            DimensionKind::Item,
            &dimensions.item,
        )
        .await
        .map_err(|source| dependent_write(DependentRecord::ItemDimensions, source))?;

        upsert_dimensions(
            uow,
            &mut line_item.crate_dimensions,
            DimensionKind::Crate,
            &dimensions.crate_dimensions,
        )
        .await
        .map_err(|source| dependent_write(DependentRecord::CrateDimensions, source))?;
    }

    if let Some(address) = &plan.address {
        upsert_address(uow, &mut line_item.address, address)
            .await
            .map_err(|source| dependent_write(DependentRecord::Address, source))?;
    }

    debug!(
        family = %plan.family,
        quantity1 = %line_item.quantity1,
        "Line item resolved"
    );
    Ok(plan.family)
}

fn dependent_write(record: DependentRecord, source: crate::error::DbError) -> ResolveError {
    error!(record = %record, error = %source, "Dependent record write failed");
    ResolveError::DependentWrite { record, source }
}

async fn upsert_dimensions(
    uow: &mut UnitOfWork,
    slot: &mut Option<Dimensions>,
    kind: DimensionKind,
    input: &DimensionsInput,
) -> DbResult<()> {
    let now = Utc::now();
    match slot {
        Some(existing) => {
            existing.apply(input, now);
            uow.dimensions().update(existing).await
        }
        None => {
            let created = Dimensions::from_input(kind, input, now);
            uow.dimensions().insert(&created).await?;
            *slot = Some(created);
            Ok(())
        }
    }
}

async fn upsert_address(
    uow: &mut UnitOfWork,
    slot: &mut Option<Address>,
    input: &AddressInput,
) -> DbResult<()> {
    let now = Utc::now();
    match slot {
        Some(existing) => {
            existing.apply(input, now);
            uow.addresses().update(existing).await
        }
        None => {
            let created = Address::from_input(input, now);
            uow.addresses().insert(&created).await?;
            *slot = Some(created);
            Ok(())
        }
    }
}
