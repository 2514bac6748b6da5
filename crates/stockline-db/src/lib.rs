//! # stockline-db: Persistence & Transactions for Stockline
//!
//! This crate runs the pure stockline-core rules against SQLite, making every
//! order mutation and its stock delta one atomic unit.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockline Data Flow                              │
//! │                                                                         │
//! │  Caller (HTTP handler, CLI, test)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockline-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌──────────────┐     │   │
//! │  │   │   Services    │   │  UnitOfWork   │   │    Stores    │     │   │
//! │  │   │               │   │               │   │              │     │   │
//! │  │   │ OrderService  │──►│ Transaction   │──►│ OrderStore   │     │   │
//! │  │   │ ProductService│   │ commit / drop │   │ ProductStore │     │   │
//! │  │   └───────┬───────┘   └───────────────┘   └──────────────┘     │   │
//! │  │           │ plan_* / ledger::*                                  │   │
//! │  │           ▼                                                     │   │
//! │  │     stockline-core (pure rules)                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite (WAL): products, orders, order_line_items              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`config`] - Environment configuration
//! - [`error`] - Database and service error types
//! - [`store`] - SQL views of the order and product tables
//! - [`unit_of_work`] - One transaction across both stores
//! - [`service`] - Ledger and order lifecycle entry points
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockline_db::{Database, DbConfig};
//! use stockline_core::{Location, OrderLineItem};
//!
//! let db = Database::new(DbConfig::new("stockline.db")).await?;
//!
//! let order = db
//!     .orders()
//!     .create(vec![OrderLineItem::new(1, Location::Munich, 5)])
//!     .await?;
//!
//! db.orders().delete(&order.id).await?; // stock goes back
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod service;
pub mod store;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, StocklineConfig};
pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use pool::{Database, DbConfig};
pub use service::{OrderService, ProductService};
pub use store::{OrderStore, ProductStore};
pub use unit_of_work::UnitOfWork;
