//! # Validation Module
//!
//! Input validation for order requests and product edits.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (transport, out of scope)                             │
//! │  └── Deserialization into OrderLineItem / Location                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: stockline-core                                               │
//! │  ├── THIS MODULE: shape of the request (empty, quantity, duplicates)   │
//! │  └── lifecycle: stock availability against the ledger                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0), CHECK (price_cents >= 0)                   │
//! │  └── PRIMARY KEY (product_id, location)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockline_core::validation::{validate_line_items, validate_quantity};
//! use stockline_core::{Location, OrderLineItem};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_line_items(&[OrderLineItem::new(1, Location::Munich, 5)]).is_ok());
//! assert!(validate_line_items(&[]).is_err());
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{NewProduct, OrderLineItem};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity of a line item.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// There is no upper bound here; the ledger decides how much can be ordered.
///
/// ## User Workflow
/// ```text
/// Edit line item quantity: 0
///      │
///      ▼
/// validate_quantity(0) ← THIS FUNCTION
///      │
///      ├── qty <= 0?    → Error: "quantity must be positive"
///      │                  (removing a line item is its own operation)
///      │
///      └── OK → availability check against the ledger
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock quantity set directly on a product.
///
/// Zero is allowed: a product record may sit at zero stock.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
pub fn validate_price_cents(price: i64) -> ValidationResult<()> {
    if price < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a product registration (name, price and opening stock).
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_price_cents(product.price_cents)?;
    validate_stock_quantity(product.quantity)
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates the line items of a create-order request.
///
/// ## Rules
/// - At least one line item
/// - Every quantity passes [`validate_quantity`]
/// - Each (product id, location) appears at most once
pub fn validate_line_items(items: &[OrderLineItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Empty {
            field: "line items".to_string(),
        });
    }

    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        validate_quantity(item.quantity)?;

        if !seen.insert(item.key()) {
            return Err(ValidationError::Duplicate {
                field: "line item".to_string(),
                value: item.key().to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
