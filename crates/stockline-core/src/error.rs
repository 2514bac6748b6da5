//! # Error Types
//!
//! Domain-specific error types for stockline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockline-core errors (this file)                                     │
//! │  ├── CoreError        - Order/stock rule violations                    │
//! │  ├── MissingItem      - What exactly was not found                     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockline-db errors (separate crate)                                  │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - CoreError | DbError at the service boundary    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, location, order id)
//! 3. Errors are enum variants, never String
//! 4. All variants are recoverable by the caller; nothing here is fatal

use std::fmt;

use thiserror::Error;

use crate::types::ProductKey;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These are the typed failures the order lifecycle and the stock ledger
/// raise. They propagate to the caller unmodified; retrying is a caller
/// concern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The order request is structurally invalid.
    ///
    /// ## When This Occurs
    /// - Creating an order with no line items
    /// - A line item with a zero or negative quantity
    /// - The same product/location listed twice in one request
    #[error("Invalid order: {0}")]
    InvalidOrder(ValidationError),

    /// A direct product edit is invalid (negative price, empty name, ...).
    #[error("Invalid product: {0}")]
    InvalidProduct(ValidationError),

    /// A referenced order, product or line item does not exist.
    #[error("{0} was not found")]
    ItemNotFound(MissingItem),

    /// Requested quantity exceeds the stock available at a location.
    ///
    /// ## User Workflow
    /// ```text
    /// Create order: product 1 @ MUNICH, qty 12
    ///      │
    ///      ▼
    /// Ledger: product 1 @ MUNICH has 10
    ///      │
    ///      ▼
    /// InsufficientStock { key: 1@MUNICH, available: 10, requested: 12 }
    ///      │
    ///      ▼
    /// "Insufficient stock for product 1 at MUNICH: at most 10 available, 12 requested"
    /// ```
    #[error(
        "Insufficient stock for product {} at {}: at most {available} available, {requested} requested",
        key.product_id,
        key.location
    )]
    InsufficientStock {
        key: ProductKey,
        available: i64,
        requested: i64,
    },
}

impl CoreError {
    /// Creates an `ItemNotFound` error for an order id.
    pub fn order_not_found(order_id: impl Into<String>) -> Self {
        CoreError::ItemNotFound(MissingItem::Order(order_id.into()))
    }

    /// Creates an `ItemNotFound` error for a product at a location.
    pub fn product_not_found(key: ProductKey) -> Self {
        CoreError::ItemNotFound(MissingItem::Product(key))
    }

    /// Creates an `ItemNotFound` error for a line item missing from an order.
    pub fn line_item_not_found(order_id: impl Into<String>, key: ProductKey) -> Self {
        CoreError::ItemNotFound(MissingItem::LineItem {
            order_id: order_id.into(),
            key,
        })
    }
}

// =============================================================================
// Missing Item
// =============================================================================

/// Describes what an `ItemNotFound` error refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingItem {
    /// No order with this id.
    Order(String),
    /// No product record for this (product id, location).
    Product(ProductKey),
    /// No product with this id at any location.
    ProductId(i64),
    /// The order exists but does not contain this product/location.
    LineItem { order_id: String, key: ProductKey },
}

impl fmt::Display for MissingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingItem::Order(id) => write!(f, "Order with ID {}", id),
            MissingItem::Product(key) => write!(
                f,
                "Product with ID {} at location {}",
                key.product_id, key.location
            ),
            MissingItem::ProductId(id) => write!(f, "Product with ID {}", id),
            MissingItem::LineItem { order_id, key } => write!(
                f,
                "Product with ID {} at location {} in order {}",
                key.product_id, key.location, order_id
            ),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before any stock is looked up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A collection that must not be empty is empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Duplicate value (e.g., the same product/location twice in one order).
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;

    #[test]
    fn test_insufficient_stock_message_names_key_and_maximum() {
        let err = CoreError::InsufficientStock {
            key: ProductKey::new(1, Location::Munich),
            available: 10,
            requested: 12,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 1 at MUNICH: at most 10 available, 12 requested"
        );
    }

    #[test]
    fn test_not_found_messages() {
        assert_eq!(
            CoreError::order_not_found("abc").to_string(),
            "Order with ID abc was not found"
        );
        assert_eq!(
            CoreError::product_not_found(ProductKey::new(7, Location::Cologne)).to_string(),
            "Product with ID 7 at location COLOGNE was not found"
        );
        assert_eq!(
            CoreError::line_item_not_found("abc", ProductKey::new(7, Location::Berlin))
                .to_string(),
            "Product with ID 7 at location BERLIN in order abc was not found"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Empty {
            field: "line items".to_string(),
        };
        assert_eq!(err.to_string(), "line items must contain at least one entry");

        let err = CoreError::InvalidOrder(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
        assert_eq!(err.to_string(), "Invalid order: quantity must be positive");
    }
}
