//! # Order Lifecycle Planner
//!
//! Pure planning half of the order lifecycle. Each `plan_*` function takes the
//! current order (if any), a [`StockSnapshot`] of the products it touches, the
//! [`PricingPolicy`] and the current time, and returns the next order version
//! together with every product version that changed.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   absent ──plan_create──► active ──plan_edit_quantity──► active        │
//! │                             │    ──plan_remove_line_item─► active       │
//! │                             │                                           │
//! │                             └──plan_delete──► deleted                   │
//! │                                                                         │
//! │   Every arrow returns (new order, changed products) or an error.        │
//! │   stockline-db writes both in ONE transaction, or neither.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Accounting
//! An active order *reserves* stock: the ledger quantity already excludes
//! every line item. Hence:
//! - create: decrement each item's quantity
//! - edit: available = ledger + current reservation; apply `current − new`
//! - remove: increment by the removed quantity (no availability check)
//! - delete: increment every line item (full reversal)

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::ledger;
use crate::pricing::{OrderTotals, PricingPolicy};
use crate::types::{Order, OrderLineItem, Product, ProductKey};
use crate::validation::{validate_line_items, validate_quantity};

// =============================================================================
// Stock Snapshot
// =============================================================================

/// The product records an operation may read, keyed by (product id, location).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockSnapshot {
    products: BTreeMap<ProductKey, Product>,
}

impl StockSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        products.into_iter().collect()
    }

    /// Adds or replaces a product version.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.key(), product);
    }

    /// Returns a copy with the given product versions applied.
    pub fn with_products(mut self, products: impl IntoIterator<Item = Product>) -> Self {
        for product in products {
            self.insert(product);
        }
        self
    }

    pub fn get(&self, key: ProductKey) -> Option<&Product> {
        self.products.get(&key)
    }

    /// Like [`get`](Self::get) but fails `ItemNotFound`.
    pub fn require(&self, key: ProductKey) -> CoreResult<&Product> {
        self.get(key)
            .ok_or_else(|| CoreError::product_not_found(key))
    }

}

impl FromIterator<Product> for StockSnapshot {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        StockSnapshot::new().with_products(iter)
    }
}

// =============================================================================
// Order Transition
// =============================================================================

/// Result of planning a create/edit/remove: the order to persist and the
/// product versions whose stock moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTransition {
    pub order: Order,
    pub stock: Vec<Product>,
}

// =============================================================================
// Planners
// =============================================================================

/// Plans the creation of order `id` from `items`.
///
/// ## Checks (in order)
/// 1. Request shape: non-empty, positive quantities, no duplicate keys
///    → `InvalidOrder`
/// 2. Each product exists → `ItemNotFound`
/// 3. Each quantity fits the stock on hand → `InsufficientStock`
pub fn plan_create(
    id: impl Into<String>,
    items: Vec<OrderLineItem>,
    stock: &StockSnapshot,
    policy: &PricingPolicy,
    now: DateTime<Utc>,
) -> CoreResult<OrderTransition> {
    validate_line_items(&items).map_err(CoreError::InvalidOrder)?;

    let reserved = items
        .iter()
        .map(|item| {
            let product = stock.require(item.key())?;
            ledger::apply_delta(product, -item.quantity, now)
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let totals = OrderTotals::compute(&items, stock, policy)?;
    let order = build_order(id.into(), items, totals, now, now);

    Ok(OrderTransition {
        order,
        stock: reserved,
    })
}

/// Plans changing the quantity of one line item.
///
/// `stock` must hold every product the order references, since totals are
/// recomputed over the full line-item set.
pub fn plan_edit_quantity(
    order: &Order,
    key: ProductKey,
    new_quantity: i64,
    stock: &StockSnapshot,
    policy: &PricingPolicy,
    now: DateTime<Utc>,
) -> CoreResult<OrderTransition> {
    validate_quantity(new_quantity).map_err(CoreError::InvalidOrder)?;

    let current = order
        .line_item(key)
        .ok_or_else(|| CoreError::line_item_not_found(&order.id, key))?
        .quantity;
    let product = stock.require(key)?;

    let available = product.quantity.saturating_add(current);
    if new_quantity > available {
        return Err(CoreError::InsufficientStock {
            key,
            available,
            requested: new_quantity,
        });
    }

    let delta = current - new_quantity;
    let changed: Vec<Product> = if delta == 0 {
        Vec::new()
    } else {
        vec![ledger::apply_delta(product, delta, now)?]
    };

    let items: Vec<OrderLineItem> = order
        .line_items
        .iter()
        .map(|item| {
            if item.key() == key {
                OrderLineItem {
                    quantity: new_quantity,
                    ..*item
                }
            } else {
                *item
            }
        })
        .collect();

    let after = stock.clone().with_products(changed.iter().cloned());
    let totals = OrderTotals::compute(&items, &after, policy)?;

    Ok(OrderTransition {
        order: build_order(order.id.clone(), items, totals, order.created_at, now),
        stock: changed,
    })
}

/// Plans removing one line item and returning its stock.
///
/// Totals are recomputed over the remaining items; an order may end up with
/// no line items and zero totals.
pub fn plan_remove_line_item(
    order: &Order,
    key: ProductKey,
    stock: &StockSnapshot,
    policy: &PricingPolicy,
    now: DateTime<Utc>,
) -> CoreResult<OrderTransition> {
    let removed = order
        .line_item(key)
        .ok_or_else(|| CoreError::line_item_not_found(&order.id, key))?;
    let returned = ledger::apply_delta(stock.require(key)?, removed.quantity, now)?;

    let items: Vec<OrderLineItem> = order
        .line_items
        .iter()
        .filter(|item| item.key() != key)
        .copied()
        .collect();
    let totals = OrderTotals::compute(&items, stock, policy)?;

    Ok(OrderTransition {
        order: build_order(order.id.clone(), items, totals, order.created_at, now),
        stock: vec![returned],
    })
}

/// Plans deleting an order: every line item goes back into stock.
pub fn plan_delete(
    order: &Order,
    stock: &StockSnapshot,
    now: DateTime<Utc>,
) -> CoreResult<Vec<Product>> {
    order
        .line_items
        .iter()
        .map(|item| ledger::apply_delta(stock.require(item.key())?, item.quantity, now))
        .collect()
}

fn build_order(
    id: String,
    line_items: Vec<OrderLineItem>,
    totals: OrderTotals,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Order {
    Order {
        id,
        line_items,
        subtotal_cents: totals.subtotal.cents(),
        discount_cents: totals.discount.cents(),
        order_cost_cents: totals.order_cost.cents(),
        delivery_cost_cents: totals.delivery_cost.cents(),
        delivery_time_days: totals.delivery_time_days,
        created_at,
        updated_at,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::Location;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    const ORDER_ID: &str = "8f1e2a4c-0000-4000-8000-000000000001";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn product(product_id: i64, location: Location, price_cents: i64, quantity: i64) -> Product {
        Product {
            product_id,
            location,
            name: format!("Product {}", product_id),
            price_cents,
            quantity,
            created_at: t0(),
            updated_at: t0(),
        }
    }

    fn munich(product_id: i64) -> ProductKey {
        ProductKey::new(product_id, Location::Munich)
    }

    fn quantity_of(stock: &StockSnapshot, key: ProductKey) -> i64 {
        stock.get(key).map(|p| p.quantity).unwrap_or_default()
    }

    fn catalog() -> StockSnapshot {
        StockSnapshot::from_products([
            product(1, Location::Munich, 10_000, 10),
            product(2, Location::Munich, 2_500, 4),
            product(2, Location::Cologne, 2_400, 8),
        ])
    }

    // -------------------------------------------------------------------------
    // Create
    // -------------------------------------------------------------------------

    #[test]
    fn test_create_single_item() {
        let plan = plan_create(
            ORDER_ID,
            vec![OrderLineItem::new(1, Location::Munich, 5)],
            &catalog(),
            &PricingPolicy::default(),
            t0(),
        )
        .unwrap();

        assert_eq!(plan.order.id, ORDER_ID);
        assert_eq!(plan.order.subtotal_cents, 50_000);
        assert_eq!(plan.order.order_cost_cents, 50_000);
        assert_eq!(plan.order.delivery_cost_cents, 3000);
        assert_eq!(plan.order.delivery_time_days, 2);
        assert_eq!(plan.order.created_at, t0());
        assert_eq!(plan.stock.len(), 1);
        assert_eq!(plan.stock[0].quantity, 5);
    }

    #[test]
    fn test_create_rejects_empty() {
        let err = plan_create(ORDER_ID, vec![], &catalog(), &PricingPolicy::default(), t0())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidOrder(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn test_create_rejects_over_request() {
        let err = plan_create(
            ORDER_ID,
            vec![
                OrderLineItem::new(1, Location::Munich, 1),
                OrderLineItem::new(2, Location::Munich, 5),
            ],
            &catalog(),
            &PricingPolicy::default(),
            t0(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                key: munich(2),
                available: 4,
                requested: 5,
            }
        );
    }

    #[test]
    fn test_create_unknown_product() {
        let err = plan_create(
            ORDER_ID,
            vec![OrderLineItem::new(1, Location::Hamburg, 1)],
            &catalog(),
            &PricingPolicy::default(),
            t0(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::ItemNotFound(_)));
    }

    // -------------------------------------------------------------------------
    // Edit
    // -------------------------------------------------------------------------

    fn created() -> (OrderTransition, StockSnapshot) {
        let plan = plan_create(
            ORDER_ID,
            vec![
                OrderLineItem::new(1, Location::Munich, 5),
                OrderLineItem::new(2, Location::Cologne, 3),
            ],
            &catalog(),
            &PricingPolicy::default(),
            t0(),
        )
        .unwrap();
        let stock = catalog().with_products(plan.stock.clone());
        (plan, stock)
    }

    #[test]
    fn test_edit_up_to_ledger_plus_reservation() {
        let (plan, stock) = created();
        let later = t0() + Duration::hours(1);

        // ledger 5 + reservation 5
        let edit = plan_edit_quantity(
            &plan.order,
            munich(1),
            10,
            &stock,
            &PricingPolicy::default(),
            later,
        )
        .unwrap();
        assert_eq!(edit.stock[0].quantity, 0);
        assert_eq!(edit.order.line_item(munich(1)).unwrap().quantity, 10);
        assert_eq!(edit.order.subtotal_cents, 100_000 + 7_200);
        assert_eq!(edit.order.created_at, t0());
        assert_eq!(edit.order.updated_at, later);

        let err = plan_edit_quantity(
            &plan.order,
            munich(1),
            11,
            &stock,
            &PricingPolicy::default(),
            later,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                key: munich(1),
                available: 10,
                requested: 11,
            }
        );
    }

    #[test]
    fn test_edit_decrease_frees_exact_amount() {
        let (plan, stock) = created();
        let edit = plan_edit_quantity(
            &plan.order,
            munich(1),
            2,
            &stock,
            &PricingPolicy::default(),
            t0(),
        )
        .unwrap();
        assert_eq!(edit.stock[0].quantity, 8);
    }

    #[test]
    fn test_edit_same_quantity_touches_no_stock() {
        let (plan, stock) = created();
        let edit = plan_edit_quantity(
            &plan.order,
            munich(1),
            5,
            &stock,
            &PricingPolicy::default(),
            t0(),
        )
        .unwrap();
        assert!(edit.stock.is_empty());
        assert_eq!(edit.order.line_items, plan.order.line_items);
    }

    #[test]
    fn test_edit_rejects_zero_and_missing_line_item() {
        let (plan, stock) = created();
        let policy = PricingPolicy::default();
        assert!(matches!(
            plan_edit_quantity(&plan.order, munich(1), 0, &stock, &policy, t0()),
            Err(CoreError::InvalidOrder(_))
        ));
        assert_eq!(
            plan_edit_quantity(&plan.order, munich(2), 1, &stock, &policy, t0()).unwrap_err(),
            CoreError::line_item_not_found(ORDER_ID, munich(2))
        );
    }

    // -------------------------------------------------------------------------
    // Remove / Delete
    // -------------------------------------------------------------------------

    #[test]
    fn test_remove_line_item_returns_stock_and_recomputes() {
        let (plan, stock) = created();
        let removed = plan_remove_line_item(
            &plan.order,
            munich(1),
            &stock,
            &PricingPolicy::default(),
            t0(),
        )
        .unwrap();

        assert_eq!(removed.stock[0].quantity, 10);
        assert_eq!(removed.order.line_items.len(), 1);
        assert_eq!(removed.order.subtotal_cents, 7_200);
        assert_eq!(removed.order.delivery_cost_cents, 3000);
        assert_eq!(removed.order.delivery_time_days, 2);
    }

    #[test]
    fn test_remove_last_line_item_keeps_delivery_fee() {
        let plan = plan_create(
            ORDER_ID,
            vec![OrderLineItem::new(1, Location::Munich, 5)],
            &catalog(),
            &PricingPolicy::default(),
            t0(),
        )
        .unwrap();
        let stock = catalog().with_products(plan.stock.clone());
        let removed =
            plan_remove_line_item(&plan.order, munich(1), &stock, &PricingPolicy::default(), t0())
                .unwrap();
        assert!(removed.order.line_items.is_empty());
        assert_eq!(removed.order.order_cost_cents, 0);
        assert_eq!(removed.order.delivery_cost_cents, 3000);
        assert_eq!(removed.order.delivery_time_days, 0);
    }

    #[test]
    fn test_delete_restores_every_item() {
        let (plan, stock) = created();
        let restored = stock.clone().with_products(plan_delete(&plan.order, &stock, t0()).unwrap());
        assert_eq!(quantity_of(&restored, munich(1)), 10);
        assert_eq!(
            quantity_of(&restored, ProductKey::new(2, Location::Cologne)),
            8
        );
    }

    #[test]
    fn test_delete_with_missing_product_fails() {
        let (plan, _) = created();
        let stock = StockSnapshot::from_products([product(1, Location::Munich, 10_000, 5)]);
        assert!(matches!(
            plan_delete(&plan.order, &stock, t0()),
            Err(CoreError::ItemNotFound(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    const LOCATIONS: [Location; 2] = [Location::Munich, Location::Cologne];

    /// (stock on hand, requested) per product, spread over two locations.
    fn line_specs() -> impl Strategy<Value = Vec<(i64, i64)>> {
        prop::collection::vec((0i64..50, 1i64..60), 1..8)
    }

    fn setup(lines: &[(i64, i64)]) -> (StockSnapshot, Vec<OrderLineItem>) {
        let mut stock = StockSnapshot::new();
        let mut items = Vec::new();
        for (i, (on_hand, requested)) in lines.iter().enumerate() {
            let location = LOCATIONS[i % 2];
            stock.insert(product(i as i64 + 1, location, 1_000, *on_hand));
            items.push(OrderLineItem::new(i as i64 + 1, location, *requested));
        }
        (stock, items)
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        #[test]
        fn prop_create_then_delete_restores_stock(lines in line_specs()) {
            let (before, items) = setup(&lines);
            let fits = items.iter().all(|item| item.quantity <= quantity_of(&before, item.key()));

            match plan_create(ORDER_ID, items.clone(), &before, &PricingPolicy::default(), t0()) {
                Ok(plan) => {
                    prop_assert!(fits);
                    let reserved = before.clone().with_products(plan.stock.clone());
                    for item in &items {
                        prop_assert_eq!(
                            quantity_of(&reserved, item.key()),
                            quantity_of(&before, item.key()) - item.quantity
                        );
                    }
                    let restored = reserved.clone().with_products(plan_delete(&plan.order, &reserved, t0()).unwrap());
                    for item in &items {
                        prop_assert_eq!(quantity_of(&restored, item.key()), quantity_of(&before, item.key()));
                    }
                }
                Err(err) => {
                    prop_assert!(!fits);
                    let is_insufficient = matches!(err, CoreError::InsufficientStock { .. });
                    prop_assert!(is_insufficient);
                }
            }
        }

        #[test]
        fn prop_remove_then_delete_restores_exactly_once(lines in line_specs(), pick in any::<prop::sample::Index>()) {
            let (_, items) = setup(&lines);
            // Enough stock for any request.
            let before: StockSnapshot = items
                .iter()
                .map(|item| product(item.product_id, item.location, 1_000, item.quantity + 5))
                .collect();

            let plan = plan_create(ORDER_ID, items.clone(), &before, &PricingPolicy::default(), t0()).unwrap();
            let mut stock = before.clone().with_products(plan.stock);

            let removed_key = items[pick.index(items.len())].key();
            let removed = plan_remove_line_item(&plan.order, removed_key, &stock, &PricingPolicy::default(), t0()).unwrap();
            stock = stock.with_products(removed.stock);
            prop_assert!(removed.order.line_item(removed_key).is_none());

            stock = stock.clone().with_products(plan_delete(&removed.order, &stock, t0()).unwrap());
            for item in &items {
                prop_assert_eq!(quantity_of(&stock, item.key()), quantity_of(&before, item.key()));
            }
        }
    }
}
