//! # Repository Module
//!
//! Stores for line items and the records they own.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  UnitOfWork (one transaction)                                          │
//! │       │                                                                 │
//! │       ├── uow.dimensions()  → DimensionStore  (line_item_dimensions)   │
//! │       ├── uow.addresses()   → AddressStore    (addresses)              │
//! │       └── uow.line_items()  → LineItemStore   (line_items)             │
//! │                                                                         │
//! │  Database (pool)                                                       │
//! │       └── db.line_items()   → LineItemRepository (reads)               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Stores
//!
//! - [`LineItemStore`] / [`LineItemRepository`] - Line items
//! - [`DimensionStore`] - Item and crate dimensions
//! - [`AddressStore`] - Service addresses

pub mod address;
pub mod dimensions;
pub mod line_item;

pub use address::AddressStore;
pub use dimensions::DimensionStore;
pub use line_item::{LineItemRepository, LineItemStore};
