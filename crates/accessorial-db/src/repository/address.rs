//! # Address Store
//!
//! Service addresses owned by dated-location line items.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use accessorial_core::Address;

/// Transaction-scoped access to `addresses`.
#[derive(Debug)]
pub struct AddressStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> AddressStore<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        AddressStore { conn }
    }

    /// Gets an address by ID.
    pub async fn find(&mut self, id: &str) -> DbResult<Option<Address>> {
        let row: Option<AddressRow> = sqlx::query_as(
            r#"
            SELECT
                id, street_address_1, street_address_2, street_address_3,
                city, state, postal_code, country, created_at, updated_at
            FROM addresses
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Inserts a new address.
    pub async fn insert(&mut self, address: &Address) -> DbResult<()> {
        debug!(id = %address.id, "Inserting address");

        sqlx::query(
            r#"
            INSERT INTO addresses (
                id, street_address_1, street_address_2, street_address_3,
                city, state, postal_code, country, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&address.id)
        .bind(&address.street_address_1)
        .bind(&address.street_address_2)
        .bind(&address.street_address_3)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.postal_code)
        .bind(&address.country)
        .bind(address.created_at)
        .bind(address.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Overwrites every field of an existing address, keeping its id.
    pub async fn update(&mut self, address: &Address) -> DbResult<()> {
        debug!(id = %address.id, "Updating address");

        let result = sqlx::query(
            r#"
            UPDATE addresses
            SET street_address_1 = ?2,
                street_address_2 = ?3,
                street_address_3 = ?4,
                city = ?5,
                state = ?6,
                postal_code = ?7,
                country = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&address.id)
        .bind(&address.street_address_1)
        .bind(&address.street_address_2)
        .bind(&address.street_address_3)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.postal_code)
        .bind(&address.country)
        .bind(address.updated_at)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Address", &address.id));
        }

        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: String,
    street_address_1: String,
    street_address_2: Option<String>,
    street_address_3: Option<String>,
    city: String,
    state: String,
    postal_code: String,
    country: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Address {
            id: row.id,
            street_address_1: row.street_address_1,
            street_address_2: row.street_address_2,
            street_address_3: row.street_address_3,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            country: row.country,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
