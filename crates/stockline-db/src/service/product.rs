//! # Product Service
//!
//! The persistent stock ledger. Each call runs in its own transaction:
//! load the record, apply the pure rule from [`stockline_core::ledger`],
//! upsert the new version, commit.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use stockline_core::validation::validate_new_product;
use stockline_core::{ledger, CoreError, CoreResult, MissingItem, NewProduct, Product, ProductKey};

use crate::error::ServiceResult;
use crate::pool::Database;
use crate::store::ProductStore;

/// Ledger and catalog operations over the `products` table.
#[derive(Debug, Clone)]
pub struct ProductService {
    db: Database,
}

impl ProductService {
    pub fn new(db: Database) -> Self {
        ProductService { db }
    }

    // =========================================================================
    // Ledger
    // =========================================================================

    /// Gets the product stocked at one location, if any.
    pub async fn find(&self, key: ProductKey) -> ServiceResult<Option<Product>> {
        let mut conn = self.db.acquire().await?;
        Ok(ProductStore::new(&mut conn).find_by_key(key).await?)
    }

    /// Takes `amount` units out of stock.
    ///
    /// ## Errors
    /// - `ItemNotFound` - no record for `key`
    /// - `InsufficientStock` - `amount` exceeds the quantity on hand
    pub async fn decrement(&self, key: ProductKey, amount: i64) -> ServiceResult<Product> {
        self.update(key, "decrement", |p, now| ledger::decrement(p, amount, now))
            .await
    }

    /// Puts `amount` units back into stock.
    pub async fn increment(&self, key: ProductKey, amount: i64) -> ServiceResult<Product> {
        self.update(key, "increment", |p, now| ledger::increment(p, amount, now))
            .await
    }

    /// Sets the quantity on hand.
    pub async fn set_quantity(&self, key: ProductKey, quantity: i64) -> ServiceResult<Product> {
        self.update(key, "set_quantity", |p, now| {
            ledger::set_quantity(p, quantity, now)
        })
        .await
    }

    /// Sets the unit price.
    pub async fn set_price(&self, key: ProductKey, price_cents: i64) -> ServiceResult<Product> {
        self.update(key, "set_price", |p, now| {
            ledger::set_price(p, price_cents, now)
        })
        .await
    }

    async fn update<F>(&self, key: ProductKey, operation: &'static str, rule: F) -> ServiceResult<Product>
    where
        F: FnOnce(&Product, DateTime<Utc>) -> CoreResult<Product>,
    {
        let mut uow = self.db.begin().await?;

        let current = uow
            .products()
            .find_by_key(key)
            .await?
            .ok_or_else(|| CoreError::product_not_found(key))?;

        let next = rule(&current, Utc::now()).map_err(|err| {
            warn!(
                product_id = key.product_id,
                location = %key.location,
                operation,
                error = %err,
                "Ledger update rejected"
            );
            err
        })?;

        uow.products().save(&next).await?;
        uow.commit().await?;

        info!(
            product_id = key.product_id,
            location = %key.location,
            operation,
            quantity = next.quantity,
            price_cents = next.price_cents,
            "Ledger updated"
        );
        Ok(next)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Registers a product at a location.
    ///
    /// ## Errors
    /// - `InvalidProduct` - empty name, negative price or quantity
    /// - `DbError::UniqueViolation` - the location already stocks this product
    pub async fn create(&self, new: NewProduct) -> ServiceResult<Product> {
        validate_new_product(&new).map_err(CoreError::InvalidProduct)?;

        let product = new.into_product(Utc::now());
        let mut uow = self.db.begin().await?;
        uow.products().insert(&product).await?;
        uow.commit().await?;

        info!(
            product_id = product.product_id,
            location = %product.location,
            quantity = product.quantity,
            "Product created"
        );
        Ok(product)
    }

    /// Lists the whole catalog.
    pub async fn get_all(&self) -> ServiceResult<Vec<Product>> {
        let mut conn = self.db.acquire().await?;
        Ok(ProductStore::new(&mut conn).find_all().await?)
    }

    /// Gets every location's record of one product id.
    ///
    /// ## Errors
    /// `ItemNotFound` if no location stocks the product.
    pub async fn get_by_product_id(&self, product_id: i64) -> ServiceResult<Vec<Product>> {
        let mut conn = self.db.acquire().await?;
        let products = ProductStore::new(&mut conn)
            .find_all_by_product_id(product_id)
            .await?;

        if products.is_empty() {
            return Err(CoreError::ItemNotFound(MissingItem::ProductId(product_id)).into());
        }
        Ok(products)
    }

    /// Deletes one product record.
    ///
    /// Orders referencing it are left as they are; reversing them later fails
    /// `ItemNotFound`.
    pub async fn delete(&self, key: ProductKey) -> ServiceResult<()> {
        let mut uow = self.db.begin().await?;
        if !uow.products().delete(key).await? {
            return Err(CoreError::product_not_found(key).into());
        }
        uow.commit().await?;

        info!(product_id = key.product_id, location = %key.location, "Product deleted");
        Ok(())
    }

    /// Deletes the whole catalog. Returns the number of records removed.
    pub async fn delete_all(&self) -> ServiceResult<u64> {
        let mut uow = self.db.begin().await?;
        let deleted = uow.products().delete_all().await?;
        uow.commit().await?;

        debug!(deleted, "Catalog cleared");
        Ok(deleted)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
