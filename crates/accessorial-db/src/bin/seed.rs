//! # Seed Data Generator
//!
//! Creates a demo shipment with one line item per pricing family and prints
//! the resolved items as JSON.
//!
//! ## Usage
//! ```bash
//! # In-memory database, default tariff codes
//! cargo run -p accessorial-db --bin seed
//!
//! # Persist to a file, with a config file
//! cargo run -p accessorial-db --bin seed -- --db ./accessorial_dev.db --config ./accessorial.toml
//! ```
//!
//! ## Generated Line Items
//! - Crating (105B): 20×20×70 in item in a 24×24×72 in crate → 24 cubic feet
//! - Third-party service (35A): $100.00 estimate, $150.00 actual → capped, approved
//! - Bridge toll (226A): $50.00 actual
//! - Extra stop (125A): dated stop at an address → flat 1
//! - Long carry (4A): manual quantity 2.5

use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use accessorial_core::{
    AdditionalParams, AddressInput, BaseParams, DimensionsInput, FixedPointQuantity,
    ItemLocation, Money, ThousandthInches,
};
use accessorial_db::{Database, EngineConfig};

fn inches(l: i32, w: i32, h: i32) -> DimensionsInput {
    DimensionsInput::new(
        ThousandthInches::from_inches(l),
        ThousandthInches::from_inches(w),
        ThousandthInches::from_inches(h),
    )
}

/// Logs go to stderr so stdout stays valid JSON.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,accessorial_db=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Accessorial Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: in-memory)");
                println!("  -c, --config <PATH>   Engine config file");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    init_tracing();

    let mut config = EngineConfig::load(config_path)?;
    config.database.path = db_path.unwrap_or_else(|| PathBuf::from(":memory:"));

    let db = Database::new(config.db_config()).await?;
    let service = db.service(config.tariff.clone());
    let shipment_id = Uuid::new_v4().to_string();

    info!(shipment_id = %shipment_id, "Seeding demo shipment");

    // Crating
    service
        .create(
            &shipment_id,
            BaseParams {
                location: ItemLocation::Origin,
                ..BaseParams::new("105B")
            },
            AdditionalParams {
                description: Some("Grandfather clock".into()),
                item_dimensions: Some(inches(20, 20, 70)),
                crate_dimensions: Some(inches(24, 24, 72)),
                ..Default::default()
            },
        )
        .await?;

    // Third-party service, approved, then the invoice arrives over estimate
    let piano = service
        .create(
            &shipment_id,
            BaseParams::new("35A"),
            AdditionalParams {
                description: Some("Piano tuning".into()),
                reason: Some("Piano moved across floors".into()),
                estimate_amount: Some(Money::from_cents(10_000)),
                ..Default::default()
            },
        )
        .await?;
    service.approve(&piano.id).await?;
    service
        .update(
            &piano.id,
            BaseParams::new("35A"),
            AdditionalParams {
                actual_amount: Some(Money::from_cents(15_000)),
                ..Default::default()
            },
        )
        .await?;

    // Reimbursed actual cost
    service
        .create(
            &shipment_id,
            BaseParams::new("226A"),
            AdditionalParams {
                description: Some("Bridge toll".into()),
                reason: Some("Route restriction".into()),
                actual_amount: Some(Money::from_cents(5_000)),
                ..Default::default()
            },
        )
        .await?;

    // Dated extra stop
    service
        .create(
            &shipment_id,
            BaseParams {
                location: ItemLocation::Destination,
                ..BaseParams::new("125A")
            },
            AdditionalParams {
                reason: Some("Extra delivery stop".into()),
                date: NaiveDate::from_ymd_opt(2026, 11, 2),
                time: Some("0900-1100".into()),
                address: Some(AddressInput {
                    street_address_1: "400 Lake Shore Dr".into(),
                    street_address_2: Some("Unit 12".into()),
                    street_address_3: None,
                    city: "Chicago".into(),
                    state: "IL".into(),
                    postal_code: "60611".into(),
                    country: Some("US".into()),
                }),
                ..Default::default()
            },
        )
        .await?;

    // Manual
    service
        .create(
            &shipment_id,
            BaseParams {
                quantity1: Some(FixedPointQuantity::from_raw(25_000)),
                notes: Some("Long carry, 150 ft".into()),
                ..BaseParams::new("4A")
            },
            AdditionalParams::default(),
        )
        .await?;

    let items = db.line_items().list_for_shipment(&shipment_id).await?;
    info!(count = items.len(), "Seed complete");

    println!("{}", serde_json::to_string_pretty(&items)?);

    db.close().await;
    Ok(())
}
