//! # Stores
//!
//! SQL views over a single SQLite connection.
//!
//! ## Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   &mut SqliteConnection ──► ProductStore<'c>   (the stock ledger rows)  │
//! │            │           ──► OrderStore<'c>     (orders + line items)     │
//! │            │                                                            │
//! │            ├── from db.acquire()  → plain reads                         │
//! │            └── from UnitOfWork    → reads + writes inside one tx        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A store borrows its connection mutably, so only one store is live per
//! connection at a time; take a new one for each step.

pub mod order;
pub mod product;

pub use order::OrderStore;
pub use product::ProductStore;
