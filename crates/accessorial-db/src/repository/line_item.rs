//! # Line Item Repository
//!
//! Database operations for line items.
//!
//! ## Two Access Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  LineItemStore<'c>          writes + reads inside a unit of work       │
//! │  ├── find(id)               (eager-loads dimensions and address)       │
//! │  ├── insert(item)                                                       │
//! │  ├── update(item)                                                       │
//! │  └── list_for_shipment(shipment_id)                                     │
//! │                                                                         │
//! │  LineItemRepository         read-only, straight off the pool           │
//! │  ├── get_by_id / list_for_shipment                                     │
//! │  └── count / count_addresses / count_addresses_for_line_item           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dependent records are referenced by id columns on the line item row. The
//! store writes those ids; the dimension and address rows themselves are
//! written by their own stores before the line item.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::address::AddressStore;
use super::dimensions::DimensionStore;
use crate::error::{DbError, DbResult};
use accessorial_core::{
    Address, Dimensions, FixedPointQuantity, ItemLocation, LineItem, LineItemStatus, Money,
};

const SELECT_LINE_ITEM: &str = r#"
    SELECT
        id, shipment_id, item_code,
        quantity1, quantity2, location, notes, status,
        description, reason, date, time,
        estimate_amount_cents, actual_amount_cents,
        item_dimensions_id, crate_dimensions_id, address_id,
        submitted_at, approved_at, created_at, updated_at
    FROM line_items
"#;

// =============================================================================
// Transaction-scoped Store
// =============================================================================

/// Transaction-scoped access to `line_items`.
#[derive(Debug)]
pub struct LineItemStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> LineItemStore<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        LineItemStore { conn }
    }

    /// Gets a line item by ID with its dimensions and address loaded.
    pub async fn find(&mut self, id: &str) -> DbResult<Option<LineItem>> {
        let sql = format!("{SELECT_LINE_ITEM} WHERE id = ?1");
        let row: Option<LineItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Lists a shipment's line items, oldest first.
    pub async fn list_for_shipment(&mut self, shipment_id: &str) -> DbResult<Vec<LineItem>> {
        let sql = format!("{SELECT_LINE_ITEM} WHERE shipment_id = ?1 ORDER BY created_at, id");
        let rows: Vec<LineItemRow> = sqlx::query_as(&sql)
            .bind(shipment_id)
            .fetch_all(&mut *self.conn)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(self.hydrate(row).await?);
        }
        Ok(items)
    }

    /// Inserts a new line item. Dependent records must already exist.
    pub async fn insert(&mut self, item: &LineItem) -> DbResult<()> {
        debug!(id = %item.id, item_code = %item.item_code, "Inserting line item");

        sqlx::query(
            r#"
            INSERT INTO line_items (
                id, shipment_id, item_code,
                quantity1, quantity2, location, notes, status,
                description, reason, date, time,
                estimate_amount_cents, actual_amount_cents,
                item_dimensions_id, crate_dimensions_id, address_id,
                submitted_at, approved_at, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6, ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14,
                ?15, ?16, ?17,
                ?18, ?19, ?20, ?21
            )
            "#,
        )
        .bind(&item.id)
        .bind(&item.shipment_id)
        .bind(&item.item_code)
        .bind(item.quantity1.raw())
        .bind(item.quantity2.raw())
        .bind(item.location)
        .bind(&item.notes)
        .bind(item.status)
        .bind(&item.description)
        .bind(&item.reason)
        .bind(item.date)
        .bind(&item.time)
        .bind(item.estimate_amount.map(|m| m.cents()))
        .bind(item.actual_amount.map(|m| m.cents()))
        .bind(item.item_dimensions.as_ref().map(|d| d.id.as_str()))
        .bind(item.crate_dimensions.as_ref().map(|d| d.id.as_str()))
        .bind(item.address.as_ref().map(|a| a.id.as_str()))
        .bind(item.submitted_at)
        .bind(item.approved_at)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Overwrites every mutable column of an existing line item.
    pub async fn update(&mut self, item: &LineItem) -> DbResult<()> {
        debug!(id = %item.id, item_code = %item.item_code, "Updating line item");

        let result = sqlx::query(
            r#"
            UPDATE line_items
            SET item_code = ?2,
                quantity1 = ?3,
                quantity2 = ?4,
                location = ?5,
                notes = ?6,
                status = ?7,
                description = ?8,
                reason = ?9,
                date = ?10,
                time = ?11,
                estimate_amount_cents = ?12,
                actual_amount_cents = ?13,
                item_dimensions_id = ?14,
                crate_dimensions_id = ?15,
                address_id = ?16,
                approved_at = ?17,
                updated_at = ?18
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(&item.item_code)
        .bind(item.quantity1.raw())
        .bind(item.quantity2.raw())
        .bind(item.location)
        .bind(&item.notes)
        .bind(item.status)
        .bind(&item.description)
        .bind(&item.reason)
        .bind(item.date)
        .bind(&item.time)
        .bind(item.estimate_amount.map(|m| m.cents()))
        .bind(item.actual_amount.map(|m| m.cents()))
        .bind(item.item_dimensions.as_ref().map(|d| d.id.as_str()))
        .bind(item.crate_dimensions.as_ref().map(|d| d.id.as_str()))
        .bind(item.address.as_ref().map(|a| a.id.as_str()))
        .bind(item.approved_at)
        .bind(item.updated_at)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("LineItem", &item.id));
        }

        Ok(())
    }

    async fn hydrate(&mut self, row: LineItemRow) -> DbResult<LineItem> {
        let item_dimensions = match row.item_dimensions_id.as_deref() {
            Some(id) => Some(self.load_dimensions(id).await?),
            None => None,
        };
        let crate_dimensions = match row.crate_dimensions_id.as_deref() {
            Some(id) => Some(self.load_dimensions(id).await?),
            None => None,
        };
        let address = match row.address_id.as_deref() {
            Some(id) => Some(self.load_address(id).await?),
            None => None,
        };

        Ok(row.into_line_item(item_dimensions, crate_dimensions, address))
    }

    async fn load_dimensions(&mut self, id: &str) -> DbResult<Dimensions> {
        DimensionStore::new(&mut *self.conn)
            .find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Dimensions", id))
    }

    async fn load_address(&mut self, id: &str) -> DbResult<Address> {
        AddressStore::new(&mut *self.conn)
            .find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Address", id))
    }
}

// =============================================================================
// Pool-backed Repository
// =============================================================================

/// Read-only line item queries straight off the pool.
#[derive(Debug, Clone)]
pub struct LineItemRepository {
    pool: SqlitePool,
}

impl LineItemRepository {
    /// Creates a new LineItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LineItemRepository { pool }
    }

    /// Gets a line item by ID with its dimensions and address loaded.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<LineItem>> {
        let mut conn = self.pool.acquire().await?;
        LineItemStore::new(&mut conn).find(id).await
    }

    /// Lists a shipment's line items, oldest first.
    pub async fn list_for_shipment(&self, shipment_id: &str) -> DbResult<Vec<LineItem>> {
        let mut conn = self.pool.acquire().await?;
        LineItemStore::new(&mut conn)
            .list_for_shipment(shipment_id)
            .await
    }

    /// Total number of line items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM line_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Total number of address rows.
    pub async fn count_addresses(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of addresses attached to one line item (0 or 1).
    pub async fn count_addresses_for_line_item(&self, line_item_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM addresses a
            JOIN line_items li ON li.address_id = a.id
            WHERE li.id = ?1
            "#,
        )
        .bind(line_item_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: String,
    shipment_id: String,
    item_code: String,
    quantity1: i64,
    quantity2: i64,
    location: ItemLocation,
    notes: Option<String>,
    status: LineItemStatus,
    description: Option<String>,
    reason: Option<String>,
    date: Option<NaiveDate>,
    time: Option<String>,
    estimate_amount_cents: Option<i64>,
    actual_amount_cents: Option<i64>,
    item_dimensions_id: Option<String>,
    crate_dimensions_id: Option<String>,
    address_id: Option<String>,
    submitted_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LineItemRow {
    fn into_line_item(
        self,
        item_dimensions: Option<Dimensions>,
        crate_dimensions: Option<Dimensions>,
        address: Option<Address>,
    ) -> LineItem {
        LineItem {
            id: self.id,
            shipment_id: self.shipment_id,
            item_code: self.item_code,
            quantity1: FixedPointQuantity::from_raw(self.quantity1),
            quantity2: FixedPointQuantity::from_raw(self.quantity2),
            location: self.location,
            notes: self.notes,
            status: self.status,
            description: self.description,
            reason: self.reason,
            date: self.date,
            time: self.time,
            estimate_amount: self.estimate_amount_cents.map(Money::from_cents),
            actual_amount: self.actual_amount_cents.map(Money::from_cents),
            item_dimensions,
            crate_dimensions,
            address,
            submitted_at: self.submitted_at,
            approved_at: self.approved_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
