//! # Receipt Repository
//!
//! Read access to persisted receipts.
//!
//! Receipts are written only by [`crate::checkout`], inside the checkout
//! transaction. This repository is how collaborators fetch the result
//! afterwards.

use sqlx::SqlitePool;

use crate::error::DbResult;
use tally_core::{Receipt, ReceiptLineItem};

/// Repository for receipt reads.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Gets a receipt header by its number.
    pub async fn get(&self, receipt_number: &str) -> DbResult<Option<Receipt>> {
        let receipt = sqlx::query_as::<_, Receipt>(
            r#"
            SELECT
                receipt_number,
                cashier_id,
                card_number,
                print_date,
                total_cents,
                vat_cents
            FROM receipts
            WHERE receipt_number = ?1
            "#,
        )
        .bind(receipt_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(receipt)
    }

    /// Gets the line items of a receipt, ordered by product.
    pub async fn line_items(&self, receipt_number: &str) -> DbResult<Vec<ReceiptLineItem>> {
        let items = sqlx::query_as::<_, ReceiptLineItem>(
            r#"
            SELECT
                id,
                receipt_number,
                product_id,
                quantity,
                unit_price_cents,
                sold_at
            FROM receipt_line_items
            WHERE receipt_number = ?1
            ORDER BY product_id
            "#,
        )
        .bind(receipt_number)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts all receipts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts all receipt line items, across receipts.
    pub async fn count_line_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipt_line_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
