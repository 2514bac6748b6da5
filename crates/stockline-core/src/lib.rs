//! # stockline-core: Pure Business Logic for Stockline
//!
//! This crate is the **heart** of Stockline. It contains the order/stock
//! consistency rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockline Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Transport (out of scope: HTTP, CLI, ...)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              stockline-db (services + transactions)             │   │
//! │  │    OrderService, ProductService, UnitOfWork, stores             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ snapshots in, snapshots out            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockline-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌───────────────┐     │   │
//! │  │   │  types   │ │  ledger  │ │ pricing  │ │   lifecycle   │     │   │
//! │  │   │ Product  │ │ decrement│ │ subtotal │ │ plan_create   │     │   │
//! │  │   │ Order    │ │ increment│ │ discount │ │ plan_edit_... │     │   │
//! │  │   │ Location │ │ set_*    │ │ delivery │ │ plan_delete   │     │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └───────────────┘     │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, OrderLineItem, Location, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//! - [`ledger`] - Per-(product, location) stock transitions
//! - [`pricing`] - Order cost, discount, delivery cost and delivery time
//! - [`lifecycle`] - Order create/edit/remove/delete planning
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same snapshots in, same snapshots out
//! 2. **Immutable Snapshots**: every operation returns new versions, nothing is mutated in place
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use stockline_core::pricing::{order_cost, PricingPolicy};
//! use stockline_core::Money;
//!
//! let policy = PricingPolicy::default();
//!
//! // 10% off strictly above 1000.00
//! assert_eq!(order_cost(Money::from_cents(100_000), &policy).cents(), 100_000);
//! assert_eq!(order_cost(Money::from_cents(200_000), &policy).cents(), 180_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, MissingItem, ValidationError};
pub use lifecycle::{OrderTransition, StockSnapshot};
pub use money::Money;
pub use pricing::{OrderTotals, PricingPolicy};
pub use types::*;
