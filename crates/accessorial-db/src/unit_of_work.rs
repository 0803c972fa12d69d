//! # Unit of Work
//!
//! One SQLite transaction shared by every store a resolution touches.
//!
//! ```text
//! let mut uow = db.begin().await?;
//! uow.dimensions().insert(..)   ─┐
//! uow.addresses().update(..)     ├── same transaction
//! uow.line_items().update(..)   ─┘
//! uow.commit().await?;          ← nothing is visible before this
//! ```
//!
//! Dropping a `UnitOfWork` without committing rolls it back, so an early
//! return through `?` leaves the database untouched.

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, error};

use crate::error::{DbError, DbResult};
use crate::repository::{AddressStore, DimensionStore, LineItemStore};

/// An open transaction plus typed access to the stores.
#[derive(Debug)]
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    /// Starts a transaction on the pool.
    pub async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            DbError::TransactionFailed(format!("Failed to start transaction: {}", e))
        })?;
        debug!("Unit of work started");
        Ok(UnitOfWork { tx })
    }

    pub fn dimensions(&mut self) -> DimensionStore<'_> {
        DimensionStore::new(&mut self.tx)
    }

    pub fn addresses(&mut self) -> AddressStore<'_> {
        AddressStore::new(&mut self.tx)
    }

    pub fn line_items(&mut self) -> LineItemStore<'_> {
        LineItemStore::new(&mut self.tx)
    }

    /// The transaction's connection, for tests issuing raw SQL.
    #[cfg(test)]
    pub(crate) fn connection(&mut self) -> &mut sqlx::SqliteConnection {
        &mut *self.tx
    }

    /// Makes every write of this unit visible.
    pub async fn commit(self) -> DbResult<()> {
        self.tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            DbError::TransactionFailed(format!("Failed to commit transaction: {}", e))
        })?;
        debug!("Unit of work committed");
        Ok(())
    }

    /// Discards every write of this unit.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx.rollback().await.map_err(|e| {
            error!("Failed to roll back transaction: {}", e);
            DbError::TransactionFailed(format!("Failed to roll back transaction: {}", e))
        })?;
        debug!("Unit of work rolled back");
        Ok(())
    }
}
