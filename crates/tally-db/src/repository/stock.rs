//! # Stock Repository
//!
//! Database operations for `store_products` outside checkout.
//!
//! Restocking and price changes belong to the inventory module; `insert`
//! exists for seed data and test fixtures.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use tally_core::StockProduct;

/// Repository for stock product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = StockRepository::new(pool);
/// let on_hand = repo.get("4820000123").await?.map(|p| p.products_number);
/// ```
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Gets a stock product by its identifier.
    ///
    /// ## Returns
    /// * `Ok(Some(StockProduct))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get(&self, product_id: &str) -> DbResult<Option<StockProduct>> {
        let product = sqlx::query_as::<_, StockProduct>(
            r#"
            SELECT
                product_id,
                product_name,
                selling_price_cents,
                products_number,
                created_at,
                updated_at
            FROM store_products
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new stock product.
    ///
    /// A negative `products_number` is rejected by the schema CHECK.
    pub async fn insert(&self, product: &StockProduct) -> DbResult<()> {
        debug!(
            product_id = %product.product_id,
            products_number = product.products_number,
            "Inserting stock product"
        );

        sqlx::query(
            r#"
            INSERT INTO store_products (
                product_id, product_name, selling_price_cents, products_number,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.product_id)
        .bind(&product.product_name)
        .bind(product.selling_price_cents)
        .bind(product.products_number)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts stock products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store_products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
