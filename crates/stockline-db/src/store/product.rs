//! # Product Store
//!
//! Persistence for the per-(product, location) stock ledger.
//!
//! Every write is a single row statement keyed by `(product_id, location)`;
//! stock rules are applied before a version reaches [`ProductStore::save`].

use sqlx::SqliteConnection;
use tracing::debug;

use stockline_core::{Product, ProductKey};

use crate::error::{DbError, DbResult};

/// SQL view of the `products` table.
///
/// ## Usage
/// ```rust,ignore
/// let mut conn = db.acquire().await?;
/// let product = ProductStore::new(&mut conn).find_by_key(key).await?;
/// ```
#[derive(Debug)]
pub struct ProductStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> ProductStore<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        ProductStore { conn }
    }

    /// Gets the product stocked at one location.
    pub async fn find_by_key(&mut self, key: ProductKey) -> DbResult<Option<Product>> {
        debug!(product_id = key.product_id, location = %key.location, "Finding product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT product_id, location, name, price_cents, quantity, created_at, updated_at
            FROM products
            WHERE product_id = ?1 AND location = ?2
            "#,
        )
        .bind(key.product_id)
        .bind(key.location)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(product)
    }

    /// Gets every location's record of one product id.
    pub async fn find_all_by_product_id(&mut self, product_id: i64) -> DbResult<Vec<Product>> {
        debug!(product_id, "Finding product at all locations");

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT product_id, location, name, price_cents, quantity, created_at, updated_at
            FROM products
            WHERE product_id = ?1
            ORDER BY location
            "#,
        )
        .bind(product_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(products)
    }

    /// Lists the whole catalog.
    pub async fn find_all(&mut self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT product_id, location, name, price_cents, quantity, created_at, updated_at
            FROM products
            ORDER BY product_id, location
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Counts product records.
    pub async fn count(&mut self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(count)
    }

    /// Persists a product version under its key (insert or replace).
    ///
    /// `created_at` of an existing row is kept.
    pub async fn save(&mut self, product: &Product) -> DbResult<()> {
        debug!(
            product_id = product.product_id,
            location = %product.location,
            quantity = product.quantity,
            "Saving product"
        );

        sqlx::query(
            r#"
            INSERT INTO products (
                product_id, location, name, price_cents, quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (product_id, location) DO UPDATE SET
                name = excluded.name,
                price_cents = excluded.price_cents,
                quantity = excluded.quantity,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(product.product_id)
        .bind(product.location)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    /// Inserts a new product record.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` if the location already stocks this product.
    pub async fn insert(&mut self, product: &Product) -> DbResult<()> {
        debug!(
            product_id = product.product_id,
            location = %product.location,
            "Inserting product"
        );

        sqlx::query(
            r#"
            INSERT INTO products (
                product_id, location, name, price_cents, quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(product.product_id)
        .bind(product.location)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *self.conn)
        .await
        .map_err(|err| match DbError::from(err) {
            DbError::UniqueViolation { .. } => DbError::duplicate("product", product.key().to_string()),
            other => other,
        })?;

        Ok(())
    }

    /// Deletes one product record. Returns `false` if there was none.
    pub async fn delete(&mut self, key: ProductKey) -> DbResult<bool> {
        debug!(product_id = key.product_id, location = %key.location, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE product_id = ?1 AND location = ?2")
            .bind(key.product_id)
            .bind(key.location)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every product record. Returns the number removed.
    pub async fn delete_all(&mut self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM products")
            .execute(&mut *self.conn)
            .await?;

        debug!(deleted = result.rows_affected(), "Deleted all products");
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Utc;
    use stockline_core::Location;

    fn product(product_id: i64, location: Location, quantity: i64) -> Product {
        let now = Utc::now();
        Product {
            product_id,
            location,
            name: "Rye Bread".to_string(),
            price_cents: 349,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut store = ProductStore::new(&mut conn);

        let bread = product(1, Location::Munich, 10);
        store.insert(&bread).await.unwrap();

        let found = store.find_by_key(bread.key()).await.unwrap().unwrap();
        assert_eq!(found.quantity, 10);
        assert_eq!(found.location, Location::Munich);
        assert!(store
            .find_by_key(ProductKey::new(1, Location::Berlin))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_key_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut store = ProductStore::new(&mut conn);

        store.insert(&product(1, Location::Munich, 10)).await.unwrap();
        let err = store
            .insert(&product(1, Location::Munich, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_save_upserts_same_key() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut store = ProductStore::new(&mut conn);

        let mut bread = product(1, Location::Munich, 10);
        store.save(&bread).await.unwrap();
        bread.quantity = 0;
        store.save(&bread).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let found = store.find_by_key(bread.key()).await.unwrap().unwrap();
        assert_eq!(found.quantity, 0);
    }

    #[tokio::test]
    async fn test_negative_quantity_is_rejected_by_schema() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut store = ProductStore::new(&mut conn);

        let err = store
            .save(&product(1, Location::Munich, -1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));
    }

    #[tokio::test]
    async fn test_find_all_by_product_id_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut conn = db.acquire().await.unwrap();
        let mut store = ProductStore::new(&mut conn);

        store.save(&product(1, Location::Munich, 10)).await.unwrap();
        store.save(&product(1, Location::Cologne, 4)).await.unwrap();
        store.save(&product(2, Location::Munich, 7)).await.unwrap();

        assert_eq!(store.find_all_by_product_id(1).await.unwrap().len(), 2);
        assert!(store
            .delete(ProductKey::new(1, Location::Cologne))
            .await
            .unwrap());
        assert!(!store
            .delete(ProductKey::new(1, Location::Cologne))
            .await
            .unwrap());
        assert_eq!(store.delete_all().await.unwrap(), 2);
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
