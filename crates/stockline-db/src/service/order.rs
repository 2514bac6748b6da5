//! # Order Service
//!
//! Transactional executor of the order lifecycle.
//!
//! ## Flow of Every Mutation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. db.begin()                         one transaction                  │
//! │  2. load order (if any) + products     StockSnapshot                    │
//! │  3. lifecycle::plan_*                  pure, may reject                 │
//! │  4. save changed products              stock delta                      │
//! │  5. save / delete order                                                 │
//! │  6. commit                             all of it, or none of it         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service never opens a second connection while its transaction is
//! open, so it also works on a single-connection pool.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use stockline_core::lifecycle::{
    plan_create, plan_delete, plan_edit_quantity, plan_remove_line_item,
};
use stockline_core::{
    CoreError, Order, OrderLineItem, OrderTransition, PricingPolicy, ProductKey, StockSnapshot,
};

use crate::error::{ServiceError, ServiceResult};
use crate::pool::Database;
use crate::store::OrderStore;
use crate::unit_of_work::UnitOfWork;

/// Order lifecycle operations over orders and the stock ledger.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
    policy: PricingPolicy,
}

impl OrderService {
    pub fn new(db: Database, policy: PricingPolicy) -> Self {
        OrderService { db, policy }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates an order and reserves its stock.
    ///
    /// ## Errors
    /// - `InvalidOrder` - empty list, non-positive quantity, duplicate key
    /// - `ItemNotFound` - a product is not stocked at the requested location
    /// - `InsufficientStock` - a quantity exceeds the stock on hand
    pub async fn create(&self, line_items: Vec<OrderLineItem>) -> ServiceResult<Order> {
        let order_id = Uuid::new_v4().to_string();
        let mut uow = self.db.begin().await?;

        let stock = load_stock(&mut uow, line_items.iter().map(OrderLineItem::key)).await?;
        let plan = plan_create(order_id, line_items, &stock, &self.policy, Utc::now())
            .map_err(|err| rejected("create", None, err))?;

        apply(&mut uow, &plan).await?;
        uow.commit().await?;

        info!(
            order_id = %plan.order.id,
            line_items = plan.order.line_items.len(),
            order_cost_cents = plan.order.order_cost_cents,
            delivery_cost_cents = plan.order.delivery_cost_cents,
            delivery_time_days = plan.order.delivery_time_days,
            "Order created"
        );
        Ok(plan.order)
    }

    /// Changes the quantity of one line item.
    ///
    /// Available stock for the edit is the ledger quantity plus what this line
    /// item already reserves.
    pub async fn edit_line_item_quantity(
        &self,
        order_id: &str,
        key: ProductKey,
        quantity: i64,
    ) -> ServiceResult<Order> {
        let mut uow = self.db.begin().await?;

        let order = find_order(&mut uow, order_id).await?;
        let stock = load_stock(&mut uow, order.line_items.iter().map(OrderLineItem::key)).await?;
        let plan = plan_edit_quantity(&order, key, quantity, &stock, &self.policy, Utc::now())
            .map_err(|err| rejected("edit_line_item_quantity", Some(order_id), err))?;

        apply(&mut uow, &plan).await?;
        uow.commit().await?;

        info!(
            order_id = %order_id,
            product_id = key.product_id,
            location = %key.location,
            quantity,
            order_cost_cents = plan.order.order_cost_cents,
            "Line item quantity changed"
        );
        Ok(plan.order)
    }

    /// Removes one line item and returns its stock.
    pub async fn remove_line_item(&self, order_id: &str, key: ProductKey) -> ServiceResult<Order> {
        let mut uow = self.db.begin().await?;

        let order = find_order(&mut uow, order_id).await?;
        let stock = load_stock(&mut uow, order.line_items.iter().map(OrderLineItem::key)).await?;
        let plan = plan_remove_line_item(&order, key, &stock, &self.policy, Utc::now())
            .map_err(|err| rejected("remove_line_item", Some(order_id), err))?;

        apply(&mut uow, &plan).await?;
        uow.commit().await?;

        info!(
            order_id = %order_id,
            product_id = key.product_id,
            location = %key.location,
            remaining = plan.order.line_items.len(),
            "Line item removed"
        );
        Ok(plan.order)
    }

    /// Deletes an order, returning every reserved unit to stock first.
    pub async fn delete(&self, order_id: &str) -> ServiceResult<()> {
        let mut uow = self.db.begin().await?;

        let order = find_order(&mut uow, order_id).await?;
        let stock = load_stock(&mut uow, order.line_items.iter().map(OrderLineItem::key)).await?;
        let restored = plan_delete(&order, &stock, Utc::now())
            .map_err(|err| rejected("delete", Some(order_id), err))?;

        for product in &restored {
            uow.products().save(product).await?;
        }
        uow.orders().delete(order_id).await?;
        uow.commit().await?;

        info!(
            order_id = %order_id,
            restored = restored.len(),
            "Order deleted"
        );
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists all orders, oldest first.
    pub async fn get_all(&self) -> ServiceResult<Vec<Order>> {
        let mut conn = self.db.acquire().await?;
        Ok(OrderStore::new(&mut conn).find_all().await?)
    }

    /// Gets one order.
    ///
    /// ## Errors
    /// `ItemNotFound` if there is no such order.
    pub async fn get_by_id(&self, order_id: &str) -> ServiceResult<Order> {
        let mut conn = self.db.acquire().await?;
        OrderStore::new(&mut conn)
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::order_not_found(order_id).into())
    }

    /// Gets several orders; unknown ids are silently left out.
    pub async fn get_by_ids(&self, order_ids: &[String]) -> ServiceResult<Vec<Order>> {
        let mut conn = self.db.acquire().await?;
        Ok(OrderStore::new(&mut conn).find_all_by_id(order_ids).await?)
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn find_order(uow: &mut UnitOfWork, order_id: &str) -> ServiceResult<Order> {
    uow.orders()
        .find_by_id(order_id)
        .await?
        .ok_or_else(|| rejected("find", Some(order_id), CoreError::order_not_found(order_id)))
}

/// Loads the products behind `keys`. Missing products are simply absent from
/// the snapshot; the planner decides whether that is an error.
async fn load_stock(
    uow: &mut UnitOfWork,
    keys: impl Iterator<Item = ProductKey>,
) -> ServiceResult<StockSnapshot> {
    let keys: BTreeSet<ProductKey> = keys.collect();
    let mut stock = StockSnapshot::new();

    for key in keys {
        if let Some(product) = uow.products().find_by_key(key).await? {
            stock.insert(product);
        }
    }

    Ok(stock)
}

async fn apply(uow: &mut UnitOfWork, plan: &OrderTransition) -> ServiceResult<()> {
    for product in &plan.stock {
        uow.products().save(product).await?;
    }
    uow.orders().save(&plan.order).await?;
    Ok(())
}

fn rejected(operation: &'static str, order_id: Option<&str>, err: CoreError) -> ServiceError {
    warn!(
        operation,
        order_id = order_id.unwrap_or("-"),
        error = %err,
        "Order request rejected"
    );
    err.into()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;
    use stockline_core::{Location, NewProduct};

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .create(NewProduct {
                product_id: 1,
                location: Location::Munich,
                name: "Arabica Beans 1kg".to_string(),
                price_cents: 10_000,
                quantity: 10,
            })
            .await
            .unwrap();
        db
    }

    async fn quantity(db: &Database, key: ProductKey) -> i64 {
        db.products().find(key).await.unwrap().unwrap().quantity
    }

    #[tokio::test]
    async fn test_create_reserves_stock() {
        let db = setup().await;
        let key = ProductKey::new(1, Location::Munich);

        let order = db
            .orders()
            .create(vec![OrderLineItem::new(1, Location::Munich, 5)])
            .await
            .unwrap();

        assert_eq!(order.subtotal_cents, 50_000);
        assert_eq!(order.order_cost_cents, 50_000);
        assert_eq!(order.delivery_cost_cents, 3000);
        assert_eq!(order.delivery_time_days, 2);
        assert_eq!(quantity(&db, key).await, 5);
        assert_eq!(db.orders().get_by_id(&order.id).await.unwrap(), order);
    }

    #[tokio::test]
    async fn test_rejected_create_leaves_no_trace() {
        let db = setup().await;

        let err = db
            .orders()
            .create(vec![OrderLineItem::new(1, Location::Munich, 11)])
            .await
            .unwrap_err();

        assert!(err.is_insufficient_stock());
        assert_eq!(quantity(&db, ProductKey::new(1, Location::Munich)).await, 10);
        assert!(db.orders().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let db = setup().await;
        let orders = db.orders();
        let key = ProductKey::new(1, Location::Munich);

        assert!(orders.get_by_id("nope").await.unwrap_err().is_not_found());
        assert!(orders.delete("nope").await.unwrap_err().is_not_found());
        assert!(orders
            .remove_line_item("nope", key)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(orders
            .edit_line_item_quantity("nope", key, 1)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_custom_policy_is_used() {
        let db = setup().await;
        let policy = PricingPolicy {
            delivery_fee: stockline_core::Money::from_cents(500),
            base_delivery_days: 3,
            ..PricingPolicy::default()
        };

        let order = db
            .orders_with_policy(policy)
            .create(vec![OrderLineItem::new(1, Location::Munich, 1)])
            .await
            .unwrap();

        assert_eq!(order.delivery_cost_cents, 500);
        assert_eq!(order.delivery_time_days, 3);
    }
}
