//! # Unit of Work
//!
//! One SQLite transaction shared by the order and product stores.
//!
//! ```text
//! db.begin() ──► UnitOfWork ──► products() / orders()  (same transaction)
//!                    │
//!                    ├── commit()  → every write becomes visible at once
//!                    └── dropped   → rolled back, nothing written
//! ```
//!
//! Dropping is the rollback path: any `?` between `begin` and `commit`
//! leaves the database exactly as it was.

use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::store::{OrderStore, ProductStore};

/// An open transaction spanning orders and products.
#[derive(Debug)]
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        debug!("Transaction started");
        UnitOfWork { tx }
    }

    /// Product store bound to this transaction.
    pub fn products(&mut self) -> ProductStore<'_> {
        ProductStore::new(&mut self.tx)
    }

    /// Order store bound to this transaction.
    pub fn orders(&mut self) -> OrderStore<'_> {
        OrderStore::new(&mut self.tx)
    }

    /// Commits every write made through this unit.
    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Discards every write made through this unit.
    pub async fn rollback(self) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Transaction rolled back");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
