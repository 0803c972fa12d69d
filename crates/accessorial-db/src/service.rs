//! # Line Item Service
//!
//! Create, update and approve pre-approval line items. Each call is one unit
//! of work: validate, resolve, write the line item, commit.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create / update                                                        │
//! │       │                                                                 │
//! │       ├── validate input (every problem collected)                     │
//! │       ├── begin unit of work                                           │
//! │       ├── load line item (update only)                                 │
//! │       ├── resolver: quantity1 + dimension / address upserts            │
//! │       ├── insert / update the line item row                            │
//! │       └── commit                                                       │
//! │                                                                         │
//! │  Any error before commit drops the unit of work; nothing is saved.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Concurrent updates of the same line item are last-writer-wins; there is no
//! row version check.

use chrono::Utc;
use tracing::{info, instrument};

use crate::error::{DbError, ResolveResult};
use crate::pool::Database;
use crate::resolver::DependencyResolver;
use accessorial_core::validation::{validate_params, validate_request, validate_uuid};
use accessorial_core::{
    AdditionalParams, BaseParams, CoreError, LineItem, ResolutionRequest, TariffCodes,
    ValidationErrors,
};

/// Orchestrates resolution and persistence of line items.
#[derive(Debug, Clone)]
pub struct LineItemService {
    db: Database,
    resolver: DependencyResolver,
}

impl LineItemService {
    pub fn new(db: Database, codes: TariffCodes) -> Self {
        LineItemService {
            db,
            resolver: DependencyResolver::new(codes),
        }
    }

    /// Creates a line item from an untyped request bag.
    #[instrument(skip(self, base, additional), fields(item_code = %base.item_code))]
    pub async fn create(
        &self,
        shipment_id: &str,
        base: BaseParams,
        additional: AdditionalParams,
    ) -> ResolveResult<LineItem> {
        check(validate_shipment(shipment_id, validate_params(&base, &additional)))?;

        let mut item = LineItem::new(shipment_id, base.item_code.as_str());
        let mut uow = self.db.begin().await?;
        let family = self
            .resolver
            .resolve(&mut uow, &base, &additional, &mut item)
            .await?;
        uow.line_items().insert(&item).await?;
        uow.commit().await?;

        info!(line_item_id = %item.id, family = %family, "Line item created");
        Ok(item)
    }

    /// Creates a line item from an explicit request.
    #[instrument(skip(self, base, request), fields(item_code = %base.item_code, family = %request.family()))]
    pub async fn create_with_request(
        &self,
        shipment_id: &str,
        base: BaseParams,
        request: ResolutionRequest,
    ) -> ResolveResult<LineItem> {
        check(validate_shipment(shipment_id, validate_request(&base, &request)))?;

        let mut item = LineItem::new(shipment_id, base.item_code.as_str());
        let mut uow = self.db.begin().await?;
        let family = self
            .resolver
            .resolve_request(&mut uow, &base, &request, &mut item)
            .await?;
        uow.line_items().insert(&item).await?;
        uow.commit().await?;

        info!(line_item_id = %item.id, family = %family, "Line item created");
        Ok(item)
    }

    /// Re-resolves an existing line item from an untyped request bag.
    #[instrument(skip(self, base, additional), fields(item_code = %base.item_code))]
    pub async fn update(
        &self,
        id: &str,
        base: BaseParams,
        additional: AdditionalParams,
    ) -> ResolveResult<LineItem> {
        check(validate_params(&base, &additional))?;

        let mut uow = self.db.begin().await?;
        let mut item = uow
            .line_items()
            .find(id)
            .await?
            .ok_or_else(|| DbError::not_found("LineItem", id))?;

        let family = self
            .resolver
            .resolve(&mut uow, &base, &additional, &mut item)
            .await?;
        item.updated_at = Utc::now();
        uow.line_items().update(&item).await?;
        uow.commit().await?;

        info!(line_item_id = %item.id, family = %family, "Line item updated");
        Ok(item)
    }

    /// Re-resolves an existing line item from an explicit request.
    #[instrument(skip(self, base, request), fields(item_code = %base.item_code, family = %request.family()))]
    pub async fn update_with_request(
        &self,
        id: &str,
        base: BaseParams,
        request: ResolutionRequest,
    ) -> ResolveResult<LineItem> {
        check(validate_request(&base, &request))?;

        let mut uow = self.db.begin().await?;
        let mut item = uow
            .line_items()
            .find(id)
            .await?
            .ok_or_else(|| DbError::not_found("LineItem", id))?;

        let family = self
            .resolver
            .resolve_request(&mut uow, &base, &request, &mut item)
            .await?;
        item.updated_at = Utc::now();
        uow.line_items().update(&item).await?;
        uow.commit().await?;

        info!(line_item_id = %item.id, family = %family, "Line item updated");
        Ok(item)
    }

    /// Approves a submitted line item.
    #[instrument(skip(self))]
    pub async fn approve(&self, id: &str) -> ResolveResult<LineItem> {
        let mut uow = self.db.begin().await?;
        let mut item = uow
            .line_items()
            .find(id)
            .await?
            .ok_or_else(|| DbError::not_found("LineItem", id))?;

        item.approve(Utc::now())?;
        uow.line_items().update(&item).await?;
        uow.commit().await?;

        info!(line_item_id = %item.id, "Line item approved");
        Ok(item)
    }
}

/// Adds the shipment id check to the request's own validation result.
fn validate_shipment(
    shipment_id: &str,
    request: Result<(), ValidationErrors>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(validate_uuid("shipment_id", shipment_id));
    errors.merge(request);
    errors.into_result()
}

fn check(result: Result<(), ValidationErrors>) -> Result<(), CoreError> {
    result.map_err(CoreError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::pool::DbConfig;
    use accessorial_core::{FixedPointQuantity, LineItemStatus};

    async fn service() -> LineItemService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        LineItemService::new(db, TariffCodes::default())
    }

    fn shipment() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    #[tokio::test]
    async fn test_create_manual_item() {
        let svc = service().await;
        let base = BaseParams {
            quantity1: Some(FixedPointQuantity::from_int(3)),
            ..BaseParams::new("4A")
        };

        let item = svc
            .create(&shipment(), base, AdditionalParams::default())
            .await
            .unwrap();

        let stored = svc.db.line_items().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity1, FixedPointQuantity::from_int(3));
        assert_eq!(stored.status, LineItemStatus::Submitted);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_shipment_id() {
        let svc = service().await;
        let err = svc
            .create("not-a-uuid", BaseParams::new("4A"), AdditionalParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Core(CoreError::Validation(_))));
        assert_eq!(svc.db.line_items().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_create_saves_nothing() {
        let svc = service().await;
        let err = svc
            .create(&shipment(), BaseParams::new("4A"), AdditionalParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Quantity1 required for item code 4A");
        assert_eq!(svc.db.line_items().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_approve_twice_fails() {
        let svc = service().await;
        let base = BaseParams {
            quantity1: Some(FixedPointQuantity::from_int(1)),
            ..BaseParams::new("4A")
        };
        let item = svc
            .create(&shipment(), base, AdditionalParams::default())
            .await
            .unwrap();

        let approved = svc.approve(&item.id).await.unwrap();
        assert_eq!(approved.status, LineItemStatus::Approved);
        assert!(approved.approved_at.is_some());

        let err = svc.approve(&item.id).await.unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Core(CoreError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_unknown_item() {
        let svc = service().await;
        let err = svc
            .update("missing", BaseParams::new("4A"), AdditionalParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Db(DbError::NotFound { .. })));
    }
}
