//! End-to-end resolution scenarios against an in-memory database.

use chrono::NaiveDate;

use accessorial_core::quantity::MAX_ENCODABLE_CENTS;
use accessorial_core::{
    ActualCostRequest, AdditionalParams, AddressInput, BaseParams, CappedCostRequest, CoreError,
    DimensionsInput, FixedPointQuantity, LineItemStatus, Money, ResolutionRequest, TariffCodes,
    ThousandthInches, ValidationError,
};
use accessorial_db::{Database, DbConfig, DbError, LineItemService, ResolveError};

async fn setup() -> (Database, LineItemService) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let service = db.service(Default::default());
    (db, service)
}

fn shipment() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn address(street: &str, city: &str) -> AddressInput {
    AddressInput {
        street_address_1: street.to_string(),
        street_address_2: None,
        street_address_3: None,
        city: city.to_string(),
        state: "TX".to_string(),
        postal_code: "78701".to_string(),
        country: Some("US".to_string()),
    }
}

fn capped(estimate: i64, actual: Option<i64>) -> AdditionalParams {
    AdditionalParams {
        description: Some("Third-party piano service".into()),
        reason: Some("Piano requires tuning after move".into()),
        estimate_amount: Some(Money::from_cents(estimate)),
        actual_amount: actual.map(Money::from_cents),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_tiny_crate_volume_rounds_to_zero() {
    let (db, service) = setup().await;
    let ten = ThousandthInches::new(10);
    let params = AdditionalParams {
        description: Some("Small box".into()),
        item_dimensions: Some(DimensionsInput::new(ten, ten, ten)),
        crate_dimensions: Some(DimensionsInput::new(ten, ten, ten)),
        ..Default::default()
    };

    let item = service
        .create(&shipment(), BaseParams::new("105B"), params)
        .await
        .unwrap();

    assert_eq!(item.quantity1, FixedPointQuantity::zero());
    assert_eq!(item.description.as_deref(), Some("Small box"));

    let stored = db.line_items().get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.crate_dimensions.unwrap().length, ten);
}

#[tokio::test]
async fn test_one_cubic_foot_crate() {
    let (db, service) = setup().await;
    let foot = ThousandthInches::from_inches(12);
    let item_side = ThousandthInches::from_inches(10);
    let params = AdditionalParams {
        item_dimensions: Some(DimensionsInput::new(item_side, item_side, item_side)),
        crate_dimensions: Some(DimensionsInput::new(foot, foot, foot)),
        ..Default::default()
    };

    let item = service
        .create(&shipment(), BaseParams::new("105E"), params)
        .await
        .unwrap();

    assert_eq!(item.quantity1, FixedPointQuantity::from_raw(10_000));

    let stored = db.line_items().get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.quantity1, FixedPointQuantity::from_int(1));
    assert_eq!(
        stored.item_dimensions.unwrap().as_input(),
        DimensionsInput::new(item_side, item_side, item_side)
    );
}

#[tokio::test]
async fn test_capped_cost_bills_estimate_when_actual_is_higher() {
    let (_db, service) = setup().await;

    let item = service
        .create(&shipment(), BaseParams::new("35A"), capped(10_000, Some(15_000)))
        .await
        .unwrap();

    assert_eq!(item.quantity1, FixedPointQuantity::from_cents(10_000));
    assert_eq!(item.actual_amount, Some(Money::from_cents(15_000)));
}

#[tokio::test]
async fn test_actual_cost_without_estimate() {
    let (_db, service) = setup().await;
    let params = AdditionalParams {
        description: Some("Bridge toll".into()),
        reason: Some("Only route available".into()),
        actual_amount: Some(Money::from_cents(5_000)),
        ..Default::default()
    };

    let item = service
        .create(&shipment(), BaseParams::new("226A"), params)
        .await
        .unwrap();

    assert_eq!(item.quantity1, FixedPointQuantity::from_cents(5_000));
    assert_eq!(item.estimate_amount, None);
}

#[tokio::test]
async fn test_actual_cost_reports_every_missing_field() {
    let (db, service) = setup().await;
    let params = AdditionalParams {
        reason: Some("Only route available".into()),
        ..Default::default()
    };

    let err = service
        .create(&shipment(), BaseParams::new("226A"), params)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "description, actual amount required for item code 226A"
    );
    assert_eq!(db.line_items().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_dated_location_resolved_twice_keeps_one_address() {
    let (db, service) = setup().await;
    let first = AdditionalParams {
        reason: Some("Extra stop".into()),
        date: NaiveDate::from_ymd_opt(2026, 11, 2),
        address: Some(address("100 Congress Ave", "Austin")),
        ..Default::default()
    };

    let item = service
        .create(&shipment(), BaseParams::new("125A"), first)
        .await
        .unwrap();
    assert_eq!(item.quantity1, FixedPointQuantity::from_int(1));
    let address_id = item.address.as_ref().unwrap().id.clone();

    let second = AdditionalParams {
        reason: Some("Extra stop moved".into()),
        date: NaiveDate::from_ymd_opt(2026, 11, 9),
        time: Some("1300-1500".into()),
        address: Some(address("900 Lamar Blvd", "Round Rock")),
        ..Default::default()
    };
    let updated = service
        .update(&item.id, BaseParams::new("125A"), second)
        .await
        .unwrap();

    assert_eq!(updated.address.as_ref().unwrap().id, address_id);
    assert_eq!(db.line_items().count_addresses().await.unwrap(), 1);
    assert_eq!(
        db.line_items()
            .count_addresses_for_line_item(&item.id)
            .await
            .unwrap(),
        1
    );

    let stored = db.line_items().get_by_id(&item.id).await.unwrap().unwrap();
    let stored_address = stored.address.unwrap();
    assert_eq!(stored_address.street_address_1, "900 Lamar Blvd");
    assert_eq!(stored_address.city, "Round Rock");
    assert_eq!(stored.date, NaiveDate::from_ymd_opt(2026, 11, 9));
    assert_eq!(stored.time.as_deref(), Some("1300-1500"));
    assert_eq!(stored.quantity1, FixedPointQuantity::from_int(1));
}

#[tokio::test]
async fn test_approved_capped_cost_only_moves_actual() {
    let (db, service) = setup().await;
    let item = service
        .create(&shipment(), BaseParams::new("35A"), capped(10_000, None))
        .await
        .unwrap();
    assert_eq!(item.quantity1, FixedPointQuantity::zero());

    service.approve(&item.id).await.unwrap();

    let params = AdditionalParams {
        reason: Some("Rewritten reason".into()),
        estimate_amount: Some(Money::from_cents(99_999)),
        actual_amount: Some(Money::from_cents(8_000)),
        ..Default::default()
    };
    let updated = service
        .update(&item.id, BaseParams::new("35A"), params)
        .await
        .unwrap();

    assert_eq!(updated.quantity1, FixedPointQuantity::from_cents(8_000));

    let stored = db.line_items().get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.status, LineItemStatus::Approved);
    assert_eq!(stored.reason.as_deref(), Some("Piano requires tuning after move"));
    assert_eq!(stored.estimate_amount, Some(Money::from_cents(10_000)));
    assert_eq!(stored.actual_amount, Some(Money::from_cents(8_000)));
}

#[tokio::test]
async fn test_approved_capped_cost_keeps_actual_when_omitted() {
    let (_db, service) = setup().await;
    let item = service
        .create(&shipment(), BaseParams::new("35A"), capped(10_000, Some(6_000)))
        .await
        .unwrap();
    service.approve(&item.id).await.unwrap();

    let request = ResolutionRequest::CappedCost(CappedCostRequest {
        reason: Some("Follow-up".into()),
        ..Default::default()
    });
    let updated = service
        .update_with_request(&item.id, BaseParams::new("35A"), request)
        .await
        .unwrap();

    assert_eq!(updated.actual_amount, Some(Money::from_cents(6_000)));
    assert_eq!(updated.quantity1, FixedPointQuantity::from_cents(6_000));
}

#[tokio::test]
async fn test_manual_item_requires_quantity1() {
    let (db, service) = setup().await;

    let err = service
        .create(&shipment(), BaseParams::new("4A"), AdditionalParams::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Core(CoreError::MissingRequiredData { .. })
    ));

    let base = BaseParams {
        quantity1: Some(FixedPointQuantity::from_raw(12_500)),
        quantity2: Some(FixedPointQuantity::from_int(2)),
        ..BaseParams::new("4A")
    };
    let item = service
        .create(&shipment(), base, AdditionalParams::default())
        .await
        .unwrap();

    assert_eq!(item.quantity1, FixedPointQuantity::from_raw(12_500));
    assert_eq!(item.quantity2, FixedPointQuantity::from_int(2));
    assert_eq!(db.line_items().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_specialized_code_without_trigger_fields_is_manual() {
    let (_db, service) = setup().await;
    let base = BaseParams {
        quantity1: Some(FixedPointQuantity::from_int(4)),
        ..BaseParams::new("105B")
    };

    let item = service
        .create(&shipment(), base, AdditionalParams::default())
        .await
        .unwrap();

    assert_eq!(item.quantity1, FixedPointQuantity::from_int(4));
    assert!(item.crate_dimensions.is_none());
}

#[tokio::test]
async fn test_explicit_request_must_match_code_family() {
    let (db, service) = setup().await;
    let request = ResolutionRequest::ActualCost(ActualCostRequest {
        description: Some("Bridge toll".into()),
        reason: Some("Only route available".into()),
        actual_amount: Some(Money::from_cents(5_000)),
    });

    let err = service
        .create_with_request(&shipment(), BaseParams::new("35A"), request)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ResolveError::Core(CoreError::FamilyMismatch { .. })
    ));
    assert_eq!(db.line_items().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_validation_collects_every_problem() {
    let (db, service) = setup().await;
    let params = AdditionalParams {
        estimate_amount: Some(Money::from_cents(-100)),
        ..Default::default()
    };

    let err = service
        .create("shipment-1", BaseParams::new("35A!"), params)
        .await
        .unwrap_err();

    match err {
        ResolveError::Core(CoreError::Validation(errors)) => assert!(errors.len() >= 3),
        other => panic!("expected validation errors, got {other:?}"),
    }
    assert_eq!(db.line_items().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_update_leaves_stored_item_untouched() {
    let (db, service) = setup().await;
    let item = service
        .create(&shipment(), BaseParams::new("35A"), capped(10_000, Some(4_000)))
        .await
        .unwrap();

    let err = service
        .update(
            &item.id,
            BaseParams::new("35A"),
            AdditionalParams {
                actual_amount: Some(Money::from_cents(9_000)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "description, reason, estimate amount required for item code 35A"
    );

    let stored = db.line_items().get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.actual_amount, Some(Money::from_cents(4_000)));
    assert_eq!(stored.quantity1, FixedPointQuantity::from_cents(4_000));
}

#[tokio::test]
async fn test_approve_unknown_item() {
    let (_db, service) = setup().await;
    let err = service.approve("does-not-exist").await.unwrap_err();
    assert!(matches!(err, ResolveError::Db(DbError::NotFound { .. })));
}

#[tokio::test]
async fn test_amount_beyond_quantity_range_is_rejected() {
    let (db, service) = setup().await;
    let params = AdditionalParams {
        description: Some("Bridge toll".into()),
        reason: Some("Only route available".into()),
        actual_amount: Some(Money::from_cents(i64::MAX / 100 + 1)),
        ..Default::default()
    };

    let err = service
        .create(&shipment(), BaseParams::new("226A"), params)
        .await
        .unwrap_err();

    match err {
        ResolveError::Core(CoreError::Validation(errors)) => {
            let errors: Vec<_> = errors.iter().cloned().collect();
            assert_eq!(
                errors,
                vec![ValidationError::OutOfRange {
                    field: "actual_amount".to_string(),
                    min: 0,
                    max: MAX_ENCODABLE_CENTS,
                }]
            );
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
    assert_eq!(db.line_items().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_bag_path_prices_classified_family_with_overlapping_codes() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let service = db.service(TariffCodes {
        dated_location_prefix: "105".to_string(),
        ..Default::default()
    });
    let params = AdditionalParams {
        reason: Some("Crate pickup stop".into()),
        date: NaiveDate::from_ymd_opt(2026, 11, 2),
        address: Some(address("100 Congress Ave", "Austin")),
        ..Default::default()
    };

    let item = service
        .create(&shipment(), BaseParams::new("105B"), params)
        .await
        .unwrap();

    assert_eq!(item.quantity1, FixedPointQuantity::from_int(1));
    assert!(item.address.is_some());
    assert_eq!(db.line_items().count_addresses().await.unwrap(), 1);
}

#[tokio::test]
async fn test_approved_item_cannot_switch_code() {
    let (db, service) = setup().await;
    let item = service
        .create(&shipment(), BaseParams::new("35A"), capped(10_000, Some(15_000)))
        .await
        .unwrap();
    service.approve(&item.id).await.unwrap();

    let base = BaseParams {
        quantity1: Some(FixedPointQuantity::from_cents(50_000)),
        ..BaseParams::new("4A")
    };
    let err = service
        .update(&item.id, base, AdditionalParams::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Core(CoreError::ItemCodeLocked { .. })
    ));

    let stored = db.line_items().get_by_id(&item.id).await.unwrap().unwrap();
    assert_eq!(stored.item_code, "35A");
    assert_eq!(stored.quantity1, FixedPointQuantity::from_cents(10_000));
}
