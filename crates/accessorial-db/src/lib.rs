//! # accessorial-db: Persistence and Resolution for Accessorial Line Items
//!
//! This crate stores line items and the dimension / address records they own
//! in SQLite (sqlx), and runs every resolution inside one transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Resolution Data Flow                             │
//! │                                                                         │
//! │  Back office: create / update pre-approval request                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  accessorial-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   LineItemService ──► DependencyResolver ──► accessorial-core   │   │
//! │  │         │                    │               (pricing rules)    │   │
//! │  │         ▼                    ▼                                  │   │
//! │  │   ┌──────────────────────────────────────────────────────────┐ │   │
//! │  │   │ UnitOfWork: LineItemStore, DimensionStore, AddressStore  │ │   │
//! │  │   └──────────────────────────────────────────────────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   Database (pool.rs) · Migrations (embedded) · EngineConfig    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite: line_items, line_item_dimensions, addresses           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`config`] - Engine configuration (TOML + environment)
//! - [`error`] - Database and resolution error types
//! - [`repository`] - Line item, dimension and address stores
//! - [`unit_of_work`] - Transaction shared by the stores
//! - [`resolver`] - Dependency resolver
//! - [`service`] - Create / update / approve
//!
//! ## Usage
//!
//! ```rust,ignore
//! use accessorial_db::{Database, EngineConfig};
//!
//! let config = EngineConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//! let service = db.service(config.tariff.clone());
//!
//! let item = service.create(&shipment_id, base, additional).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DatabaseSettings, EngineConfig};
pub use error::{DbError, DbResult, DependentRecord, ResolveError, ResolveResult};
pub use pool::{Database, DbConfig};
pub use resolver::DependencyResolver;
pub use service::LineItemService;
pub use unit_of_work::UnitOfWork;

pub use repository::{AddressStore, DimensionStore, LineItemRepository, LineItemStore};
