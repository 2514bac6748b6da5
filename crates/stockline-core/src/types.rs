//! # Domain Types
//!
//! Core domain types used throughout Stockline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │ OrderLineItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id ┐   │   │  id (UUID)      │   │  product_id ┐   │       │
//! │  │  location   ┘key│   │  line_items ────┼──►│  location   ┘key│       │
//! │  │  price_cents    │   │  order_cost     │   │  quantity       │       │
//! │  │  quantity       │   │  delivery_*     │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │   ProductKey    │   │    Location     │                              │
//! │  │  (id, location) │   │  MUNICH, ...    │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! An order owns its line items. A line item only *references* a product by
//! key; the ledger (the `products` rows) is the sole owner of stock quantity.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Location
// =============================================================================

/// A fulfillment site holding its own stock and prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Location {
    Munich,
    Cologne,
    Frankfurt,
    Berlin,
    Hamburg,
}

impl Location {
    /// All locations, in declaration order.
    pub const ALL: [Location; 5] = [
        Location::Munich,
        Location::Cologne,
        Location::Frankfurt,
        Location::Berlin,
        Location::Hamburg,
    ];

    /// The wire/database spelling (`"MUNICH"`, ...).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Location::Munich => "MUNICH",
            Location::Cologne => "COLOGNE",
            Location::Frankfurt => "FRANKFURT",
            Location::Berlin => "BERLIN",
            Location::Hamburg => "HAMBURG",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown location name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown location '{0}'")]
pub struct UnknownLocation(pub String);

impl FromStr for Location {
    type Err = UnknownLocation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::ALL
            .into_iter()
            .find(|location| location.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLocation(s.to_string()))
    }
}

// =============================================================================
// Product Key
// =============================================================================

/// Composite identity of a stock record: one product at one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductKey {
    pub product_id: i64,
    pub location: Location,
}

impl ProductKey {
    #[inline]
    pub const fn new(product_id: i64, location: Location) -> Self {
        ProductKey {
            product_id,
            location,
        }
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.product_id, self.location)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product stocked at one location.
///
/// The same `product_id` may exist at several locations, each with its own
/// price and quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier, shared across locations.
    pub product_id: i64,

    /// Where this stock is held.
    pub location: Location,

    /// Display name.
    pub name: String,

    /// Unit price in cents (never negative).
    pub price_cents: i64,

    /// Quantity on hand (never negative).
    pub quantity: i64,

    /// When the record was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the record was last changed.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the composite key of this record.
    #[inline]
    pub fn key(&self) -> ProductKey {
        ProductKey::new(self.product_id, self.location)
    }

    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be taken from this record.
    #[inline]
    pub fn has_stock(&self, quantity: i64) -> bool {
        quantity <= self.quantity
    }
}

/// Input for registering a product at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub product_id: i64,
    pub location: Location,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

impl NewProduct {
    #[inline]
    pub fn key(&self) -> ProductKey {
        ProductKey::new(self.product_id, self.location)
    }

    /// Turns the input into a stored record stamped with `now`.
    pub fn into_product(self, now: DateTime<Utc>) -> Product {
        Product {
            product_id: self.product_id,
            location: self.location,
            name: self.name.trim().to_string(),
            price_cents: self.price_cents,
            quantity: self.quantity,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Order Line Item
// =============================================================================

/// One (product, location, quantity) entry of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub product_id: i64,
    pub location: Location,
    pub quantity: i64,
}

impl OrderLineItem {
    #[inline]
    pub const fn new(product_id: i64, location: Location, quantity: i64) -> Self {
        OrderLineItem {
            product_id,
            location,
            quantity,
        }
    }

    /// Returns the key of the product this line item reserves stock from.
    #[inline]
    pub fn key(&self) -> ProductKey {
        ProductKey::new(self.product_id, self.location)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer order and the totals derived from its current line items.
///
/// Totals are never edited directly: every lifecycle operation recomputes
/// them from the line-item set (see [`crate::pricing`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Ordered line items, in request order.
    pub line_items: Vec<OrderLineItem>,

    /// Σ unit price × quantity, before discount.
    pub subtotal_cents: i64,

    /// Discount granted on the subtotal.
    pub discount_cents: i64,

    /// Subtotal minus discount.
    pub order_cost_cents: i64,

    /// Delivery fee (zero above the free-delivery threshold).
    pub delivery_cost_cents: i64,

    /// Delivery time in days.
    pub delivery_time_days: i64,

    /// When the order was created. Never changes.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the order was last changed.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Finds the line item for a product/location, if present.
    pub fn line_item(&self, key: ProductKey) -> Option<&OrderLineItem> {
        self.line_items.iter().find(|item| item.key() == key)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_round_trips_through_str() {
        for location in Location::ALL {
            assert_eq!(location.as_str().parse::<Location>(), Ok(location));
        }
        assert_eq!("munich".parse::<Location>(), Ok(Location::Munich));
        assert!("PARIS".parse::<Location>().is_err());
    }

    #[test]
    fn test_location_serializes_in_upper_case() {
        let json = serde_json::to_string(&Location::Frankfurt).unwrap();
        assert_eq!(json, "\"FRANKFURT\"");
    }

    #[test]
    fn test_line_item_json_shape() {
        let item: OrderLineItem =
            serde_json::from_str(r#"{"productId":1,"location":"MUNICH","quantity":5}"#).unwrap();
        assert_eq!(item, OrderLineItem::new(1, Location::Munich, 5));
        assert_eq!(item.key(), ProductKey::new(1, Location::Munich));
    }

    #[test]
    fn test_product_key_ordering_groups_by_product() {
        let a = ProductKey::new(1, Location::Hamburg);
        let b = ProductKey::new(2, Location::Munich);
        assert!(a < b);
        assert_eq!(a.to_string(), "1@HAMBURG");
    }
}
