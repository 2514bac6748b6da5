//! # Pricing & Delivery Calculator
//!
//! Turns a line-item set into order cost, discount, delivery cost and
//! delivery time. Pure: the ledger is consulted only for unit prices, through
//! a [`StockSnapshot`].
//!
//! ## Evaluation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line items ──► subtotal = Σ price × qty                               │
//! │                    │                                                    │
//! │                    ├──► order cost  = subtotal − 10%  if > 1000.00      │
//! │                    │                                                    │
//! │                    └──► delivery    = 0.00 if > 500.00, else 30.00      │
//! │                                                                         │
//! │  line items ──► extra days = distinct locations                        │
//! │                    │                                                    │
//! │                    └──► delivery time = 2 × extra days                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both thresholds compare strictly (`>`): 1000.00 pays full price, 500.00
//! pays the fee.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::lifecycle::StockSnapshot;
use crate::money::Money;
use crate::types::{Location, OrderLineItem};

// =============================================================================
// Pricing Policy
// =============================================================================

/// Thresholds and fees used by the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    /// Subtotals strictly above this get the discount.
    pub discount_threshold: Money,
    /// Discount in basis points (1000 = 10%).
    pub discount_bps: u32,
    /// Subtotals strictly above this ship for free.
    pub free_delivery_threshold: Money,
    /// Delivery fee charged at or below the free-delivery threshold.
    pub delivery_fee: Money,
    /// Days per distinct fulfillment location.
    pub base_delivery_days: i64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        PricingPolicy {
            discount_threshold: Money::from_cents(100_000),
            discount_bps: 1000,
            free_delivery_threshold: Money::from_cents(50_000),
            delivery_fee: Money::from_cents(3000),
            base_delivery_days: 2,
        }
    }
}

// =============================================================================
// Calculator Steps
// =============================================================================

/// `unit price × quantity` for one line item.
///
/// Fails `ItemNotFound` if the snapshot has no product for the item's key.
pub fn line_item_value(item: &OrderLineItem, stock: &StockSnapshot) -> CoreResult<Money> {
    let product = stock.require(item.key())?;
    Ok(product.price().multiply_quantity(item.quantity))
}

/// Σ line item values. The empty set totals zero.
pub fn order_subtotal(items: &[OrderLineItem], stock: &StockSnapshot) -> CoreResult<Money> {
    items
        .iter()
        .map(|item| line_item_value(item, stock))
        .sum()
}

/// Discount granted on `subtotal` (zero at or below the threshold).
pub fn discount(subtotal: Money, policy: &PricingPolicy) -> Money {
    if subtotal > policy.discount_threshold {
        subtotal.percentage(policy.discount_bps)
    } else {
        Money::zero()
    }
}

/// Subtotal after discount.
pub fn order_cost(subtotal: Money, policy: &PricingPolicy) -> Money {
    if subtotal > policy.discount_threshold {
        subtotal.apply_percentage_discount(policy.discount_bps)
    } else {
        subtotal
    }
}

/// Delivery fee for `subtotal`.
pub fn delivery_cost(subtotal: Money, policy: &PricingPolicy) -> Money {
    if subtotal > policy.free_delivery_threshold {
        Money::zero()
    } else {
        policy.delivery_fee
    }
}

/// Number of distinct locations the items ship from.
pub fn extra_days(items: &[OrderLineItem]) -> i64 {
    items
        .iter()
        .map(|item| item.location)
        .collect::<BTreeSet<Location>>()
        .len() as i64
}

/// `base days × distinct locations`.
pub fn delivery_time(items: &[OrderLineItem], policy: &PricingPolicy) -> i64 {
    policy.base_delivery_days * extra_days(items)
}

// =============================================================================
// Order Totals
// =============================================================================

/// Everything the calculator derives from a line-item set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub order_cost: Money,
    pub delivery_cost: Money,
    pub delivery_time_days: i64,
}

impl OrderTotals {
    /// Runs the full calculator over `items`.
    ///
    /// No availability check happens here; stock reservation is the
    /// lifecycle planner's concern. An empty set still runs every step: it
    /// costs nothing, pays the delivery fee and ships in zero days.
    pub fn compute(
        items: &[OrderLineItem],
        stock: &StockSnapshot,
        policy: &PricingPolicy,
    ) -> CoreResult<Self> {
        let subtotal = order_subtotal(items, stock)?;
        let discount = discount(subtotal, policy);
        let order_cost = order_cost(subtotal, policy);
        let delivery_cost = delivery_cost(subtotal, policy);
        let delivery_time_days = delivery_time(items, policy);

        Ok(OrderTotals {
            subtotal,
            discount,
            order_cost,
            delivery_cost,
            delivery_time_days,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
