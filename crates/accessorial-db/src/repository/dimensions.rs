//! # Dimension Store
//!
//! Item and crate measurements owned by a line item. Rows are written through
//! an open transaction (see [`crate::unit_of_work`]).

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use accessorial_core::{DimensionKind, Dimensions, ThousandthInches};

/// Transaction-scoped access to `line_item_dimensions`.
#[derive(Debug)]
pub struct DimensionStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> DimensionStore<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        DimensionStore { conn }
    }

    /// Gets a dimension record by ID.
    pub async fn find(&mut self, id: &str) -> DbResult<Option<Dimensions>> {
        let row: Option<DimensionsRow> = sqlx::query_as(
            r#"
            SELECT id, kind, length, width, height, created_at, updated_at
            FROM line_item_dimensions
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Inserts a new record.
    pub async fn insert(&mut self, dims: &Dimensions) -> DbResult<()> {
        debug!(id = %dims.id, kind = %dims.kind, "Inserting dimensions");

        sqlx::query(
            r#"
            INSERT INTO line_item_dimensions (
                id, kind, length, width, height, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&dims.id)
        .bind(dims.kind)
        .bind(dims.length.value())
        .bind(dims.width.value())
        .bind(dims.height.value())
        .bind(dims.created_at)
        .bind(dims.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Overwrites the measurements of an existing record.
    pub async fn update(&mut self, dims: &Dimensions) -> DbResult<()> {
        debug!(id = %dims.id, kind = %dims.kind, "Updating dimensions");

        let result = sqlx::query(
            r#"
            UPDATE line_item_dimensions
            SET length = ?2, width = ?3, height = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&dims.id)
        .bind(dims.length.value())
        .bind(dims.width.value())
        .bind(dims.height.value())
        .bind(dims.updated_at)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Dimensions", &dims.id));
        }

        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DimensionsRow {
    id: String,
    kind: DimensionKind,
    length: i32,
    width: i32,
    height: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DimensionsRow> for Dimensions {
    fn from(row: DimensionsRow) -> Self {
        Dimensions {
            id: row.id,
            kind: row.kind,
            length: ThousandthInches::new(row.length),
            width: ThousandthInches::new(row.width),
            height: ThousandthInches::new(row.height),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
