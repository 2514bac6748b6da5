//! # Services
//!
//! Transactional entry points. Each mutating call follows the same shape:
//!
//! ```text
//! begin ──► load snapshots ──► stockline-core rule ──► save versions ──► commit
//!   │                               │
//!   └────────── any error: UnitOfWork dropped, transaction rolled back
//! ```
//!
//! - [`ProductService`] - the stock ledger (find, decrement, increment, set_*)
//!   plus catalog administration
//! - [`OrderService`] - the order lifecycle (create, edit, remove, delete)

pub mod order;
pub mod product;

pub use order::OrderService;
pub use product::ProductService;
