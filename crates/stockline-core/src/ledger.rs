//! # Stock Ledger Rules
//!
//! Pure per-(product, location) stock transitions.
//!
//! Every function takes the current [`Product`] snapshot and returns the next
//! one; nothing is mutated in place. Persisting the new version under the same
//! key is the caller's job (see `stockline_db::ProductService`).
//!
//! ```text
//!   Product { qty: 10 } ──decrement(3)──► Product { qty: 7 }
//!   Product { qty: 7 }  ──decrement(8)──► InsufficientStock { available: 7 }
//!   Product { qty: 0 }  ──(nothing)─────► record stays, never auto-deleted
//! ```

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Product;
use crate::validation::{validate_price_cents, validate_stock_quantity};

/// Takes `amount` units out of stock.
///
/// Fails with `InsufficientStock` if `amount` exceeds the quantity on hand.
/// Reaching zero is fine; the record is kept.
pub fn decrement(product: &Product, amount: i64, now: DateTime<Utc>) -> CoreResult<Product> {
    require_positive(amount)?;
    take(product, amount, now)
}

/// Puts `amount` previously reserved units back into stock.
///
/// No upper bound; saturates at `i64::MAX`.
pub fn increment(product: &Product, amount: i64, now: DateTime<Utc>) -> CoreResult<Product> {
    require_positive(amount)?;
    Ok(put_back(product, amount, now))
}

/// Administrative stock edit.
pub fn set_quantity(product: &Product, quantity: i64, now: DateTime<Utc>) -> CoreResult<Product> {
    validate_stock_quantity(quantity).map_err(CoreError::InvalidProduct)?;
    Ok(Product {
        quantity,
        updated_at: now,
        ..product.clone()
    })
}

/// Administrative price edit. Existing orders keep their stored totals until
/// their next mutation.
pub fn set_price(product: &Product, price_cents: i64, now: DateTime<Utc>) -> CoreResult<Product> {
    validate_price_cents(price_cents).map_err(CoreError::InvalidProduct)?;
    Ok(Product {
        price_cents,
        updated_at: now,
        ..product.clone()
    })
}

/// Applies a signed stock delta: positive returns stock, negative reserves it.
///
/// Used by the lifecycle planner, where `delta = current − new` for quantity
/// edits. A zero delta yields an unchanged product.
pub fn apply_delta(product: &Product, delta: i64, now: DateTime<Utc>) -> CoreResult<Product> {
    match delta {
        0 => Ok(product.clone()),
        d if d > 0 => Ok(put_back(product, d, now)),
        d => take(product, d.saturating_neg(), now),
    }
}

fn take(product: &Product, amount: i64, now: DateTime<Utc>) -> CoreResult<Product> {
    if !product.has_stock(amount) {
        return Err(CoreError::InsufficientStock {
            key: product.key(),
            available: product.quantity,
            requested: amount,
        });
    }

    Ok(Product {
        quantity: product.quantity - amount,
        updated_at: now,
        ..product.clone()
    })
}

fn put_back(product: &Product, amount: i64, now: DateTime<Utc>) -> Product {
    Product {
        quantity: product.quantity.saturating_add(amount),
        updated_at: now,
        ..product.clone()
    }
}

fn require_positive(amount: i64) -> CoreResult<()> {
    if amount <= 0 {
        return Err(CoreError::InvalidProduct(ValidationError::MustBePositive {
            field: "amount".to_string(),
        }));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, ProductKey};
    use chrono::TimeZone;

    fn product(quantity: i64) -> Product {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        Product {
            product_id: 1,
            location: Location::Munich,
            name: "Filter Coffee 500g".to_string(),
            price_cents: 10_000,
            quantity,
            created_at: created,
            updated_at: created,
        }
    }

    fn later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_decrement_reduces_quantity() {
        let next = decrement(&product(10), 3, later()).unwrap();
        assert_eq!(next.quantity, 7);
        assert_eq!(next.updated_at, later());
        assert_eq!(next.created_at, product(10).created_at);
    }

    #[test]
    fn test_decrement_to_zero_keeps_record() {
        let next = decrement(&product(5), 5, later()).unwrap();
        assert_eq!(next.quantity, 0);
        assert_eq!(next.key(), ProductKey::new(1, Location::Munich));
    }

    #[test]
    fn test_decrement_beyond_stock_fails() {
        let err = decrement(&product(5), 6, later()).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                key: ProductKey::new(1, Location::Munich),
                available: 5,
                requested: 6,
            }
        );
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert!(matches!(
            decrement(&product(5), 0, later()),
            Err(CoreError::InvalidProduct(_))
        ));
        assert!(matches!(
            increment(&product(5), -1, later()),
            Err(CoreError::InvalidProduct(_))
        ));
    }

    #[test]
    fn test_increment_saturates() {
        assert_eq!(increment(&product(5), 4, later()).unwrap().quantity, 9);
        assert_eq!(
            increment(&product(i64::MAX - 1), 10, later()).unwrap().quantity,
            i64::MAX
        );
    }

    #[test]
    fn test_set_quantity_and_price() {
        assert_eq!(set_quantity(&product(5), 0, later()).unwrap().quantity, 0);
        assert!(set_quantity(&product(5), -1, later()).is_err());
        assert_eq!(set_price(&product(5), 250, later()).unwrap().price_cents, 250);
        assert!(set_price(&product(5), -1, later()).is_err());
    }

    #[test]
    fn test_apply_delta() {
        let p = product(5);
        assert_eq!(apply_delta(&p, 0, later()).unwrap(), p);
        assert_eq!(apply_delta(&p, 3, later()).unwrap().quantity, 8);
        assert_eq!(apply_delta(&p, -5, later()).unwrap().quantity, 0);
        assert!(matches!(
            apply_delta(&p, -6, later()),
            Err(CoreError::InsufficientStock { available: 5, requested: 6, .. })
        ));
    }
}
