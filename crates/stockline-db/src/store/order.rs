//! # Order Store
//!
//! Persistence for orders and their owned line items.
//!
//! ## Layout
//! ```text
//! orders                      order_line_items
//! ┌──────────────────────┐    ┌───────────────────────────────────────────┐
//! │ id (PK)              │◄───┤ order_id (FK, ON DELETE CASCADE)          │
//! │ subtotal_cents       │    │ position      ← preserves request order   │
//! │ discount_cents       │    │ product_id ┐                              │
//! │ order_cost_cents     │    │ location   ┘ references a product by key  │
//! │ delivery_cost_cents  │    │ quantity                                  │
//! │ delivery_time_days   │    └───────────────────────────────────────────┘
//! │ created_at/updated_at│
//! └──────────────────────┘
//! ```
//!
//! [`OrderStore::save`] writes several statements; call it through a
//! [`UnitOfWork`](crate::UnitOfWork) so the header and its line items land
//! together.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use stockline_core::{Order, OrderLineItem};

use crate::error::DbResult;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    subtotal_cents: i64,
    discount_cents: i64,
    order_cost_cents: i64,
    delivery_cost_cents: i64,
    delivery_time_days: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, line_items: Vec<OrderLineItem>) -> Order {
        Order {
            id: self.id,
            line_items,
            subtotal_cents: self.subtotal_cents,
            discount_cents: self.discount_cents,
            order_cost_cents: self.order_cost_cents,
            delivery_cost_cents: self.delivery_cost_cents,
            delivery_time_days: self.delivery_time_days,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// SQL view of the `orders` and `order_line_items` tables.
#[derive(Debug)]
pub struct OrderStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> OrderStore<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        OrderStore { conn }
    }

    /// Gets an order with its line items.
    pub async fn find_by_id(&mut self, id: &str) -> DbResult<Option<Order>> {
        debug!(order_id = %id, "Finding order");

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, subtotal_cents, discount_cents, order_cost_cents,
                   delivery_cost_cents, delivery_time_days, created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        match row {
            Some(row) => {
                let items = self.line_items(&row.id).await?;
                Ok(Some(row.into_order(items)))
            }
            None => Ok(None),
        }
    }

    /// Gets the orders with the given ids, in request order.
    ///
    /// Missing ids are skipped; repeated ids are returned once.
    pub async fn find_all_by_id(&mut self, ids: &[String]) -> DbResult<Vec<Order>> {
        let mut seen = HashSet::with_capacity(ids.len());
        let mut orders = Vec::with_capacity(ids.len());

        for id in ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            if let Some(order) = self.find_by_id(id).await? {
                orders.push(order);
            }
        }

        Ok(orders)
    }

    /// Lists all orders, oldest first.
    pub async fn find_all(&mut self) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, subtotal_cents, discount_cents, order_cost_cents,
                   delivery_cost_cents, delivery_time_days, created_at, updated_at
            FROM orders
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.line_items(&row.id).await?;
            orders.push(row.into_order(items));
        }

        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// Persists an order version: upserts the header and replaces its line
    /// items.
    pub async fn save(&mut self, order: &Order) -> DbResult<()> {
        debug!(
            order_id = %order.id,
            line_items = order.line_items.len(),
            "Saving order"
        );

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, subtotal_cents, discount_cents, order_cost_cents,
                delivery_cost_cents, delivery_time_days, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (id) DO UPDATE SET
                subtotal_cents = excluded.subtotal_cents,
                discount_cents = excluded.discount_cents,
                order_cost_cents = excluded.order_cost_cents,
                delivery_cost_cents = excluded.delivery_cost_cents,
                delivery_time_days = excluded.delivery_time_days,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&order.id)
        .bind(order.subtotal_cents)
        .bind(order.discount_cents)
        .bind(order.order_cost_cents)
        .bind(order.delivery_cost_cents)
        .bind(order.delivery_time_days)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *self.conn)
        .await?;

        sqlx::query("DELETE FROM order_line_items WHERE order_id = ?1")
            .bind(&order.id)
            .execute(&mut *self.conn)
            .await?;

        for (position, item) in order.line_items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_line_items (order_id, position, product_id, location, quantity)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&order.id)
            .bind(position as i64)
            .bind(item.product_id)
            .bind(item.location)
            .bind(item.quantity)
            .execute(&mut *self.conn)
            .await?;
        }

        Ok(())
    }

    /// Deletes an order and (by cascade) its line items. Returns `false` if
    /// there was none.
    pub async fn delete(&mut self, id: &str) -> DbResult<bool> {
        debug!(order_id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn line_items(&mut self, order_id: &str) -> DbResult<Vec<OrderLineItem>> {
        let items = sqlx::query_as::<_, OrderLineItem>(
            r#"
            SELECT product_id, location, quantity
            FROM order_line_items
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use stockline_core::Location;

    fn order(id: &str, line_items: Vec<OrderLineItem>) -> Order {
        let now = Utc::now();
        Order {
            id: id.to_string(),
            line_items,
            subtotal_cents: 50_000,
            discount_cents: 0,
            order_cost_cents: 50_000,
            delivery_cost_cents: 3000,
            delivery_time_days: 2,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_save_and_find_keeps_line_item_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut store = OrderStore::new(&mut conn);

        let items = vec![
            OrderLineItem::new(3, Location::Hamburg, 1),
            OrderLineItem::new(1, Location::Munich, 5),
            OrderLineItem::new(2, Location::Munich, 2),
        ];
        store.save(&order("a", items.clone())).await.unwrap();

        let found = store.find_by_id("a").await.unwrap().unwrap();
        assert_eq!(found.line_items, items);
        assert_eq!(found.order_cost_cents, 50_000);
        assert!(store.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_line_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut store = OrderStore::new(&mut conn);

        store
            .save(&order(
                "a",
                vec![
                    OrderLineItem::new(1, Location::Munich, 5),
                    OrderLineItem::new(2, Location::Munich, 2),
                ],
            ))
            .await
            .unwrap();
        store
            .save(&order("a", vec![OrderLineItem::new(2, Location::Munich, 1)]))
            .await
            .unwrap();

        let found = store.find_by_id("a").await.unwrap().unwrap();
        assert_eq!(found.line_items, vec![OrderLineItem::new(2, Location::Munich, 1)]);
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_all_by_id_skips_missing_and_repeats() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut store = OrderStore::new(&mut conn);

        store.save(&order("a", vec![])).await.unwrap();
        store.save(&order("b", vec![])).await.unwrap();

        let ids = vec!["b".to_string(), "x".to_string(), "a".to_string(), "b".to_string()];
        let found: Vec<String> = store
            .find_all_by_id(&ids)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(found, vec!["b".to_string(), "a".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_line_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut store = OrderStore::new(&mut conn);

        store
            .save(&order("a", vec![OrderLineItem::new(1, Location::Munich, 5)]))
            .await
            .unwrap();
        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_line_items")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
