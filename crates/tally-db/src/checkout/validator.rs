//! # Stock Validator
//!
//! Locks, checks and prices every product of an aggregated cart inside the
//! open checkout transaction.
//!
//! ## Locking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN (deferred)                                                       │
//! │    UPDATE store_products SET products_number = products_number        │
//! │      WHERE product_id = 'A' RETURNING <the whole row>                  │
//! │    ▲                                                                    │
//! │    └── first write of the transaction: takes the database write lock,  │
//! │        waiting in the busy handler while another checkout holds it     │
//! │                                                                         │
//! │    same for 'B', 'C', ... in ascending product order                   │
//! │                                                                         │
//! │  Nothing another checkout commits can change these rows until this     │
//! │  transaction ends, so the quantities read here are the ones the        │
//! │  decrement applies to.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use tally_core::{AggregatedCart, CheckoutError, CheckoutResult, PricedCart, PricedLine, StockProduct};

use super::classifier::{classify, FailureSite};
use super::CheckoutTx;

/// Confirms every aggregated product exists with enough units, and prices
/// the cart from the locked rows.
///
/// Fails on the first missing or under-stocked product (in product order)
/// with a single `StockUnavailable`.
pub async fn validate_stock(tx: &mut CheckoutTx, cart: &AggregatedCart) -> CheckoutResult<PricedCart> {
    let mut lines = Vec::with_capacity(cart.len());

    for item in cart.iter() {
        let site = FailureSite::LockStock {
            product_id: &item.product_id,
            requested: item.quantity,
        };

        let row = sqlx::query_as::<_, StockProduct>(
            r#"
            UPDATE store_products
            SET products_number = products_number
            WHERE product_id = ?1
            RETURNING
                product_id,
                product_name,
                selling_price_cents,
                products_number,
                created_at,
                updated_at
            "#,
        )
        .bind(&item.product_id)
        .fetch_optional(tx.conn())
        .await
        .map_err(|e| classify(e.into(), site))?;

        let Some(stock) = row else {
            debug!(product_id = %item.product_id, "Product not in stock table");
            return Err(CheckoutError::StockUnavailable {
                product_id: item.product_id.clone(),
                requested: item.quantity,
                available: None,
            });
        };

        if !stock.can_sell(item.quantity) {
            debug!(
                product_id = %item.product_id,
                requested = item.quantity,
                available = stock.products_number,
                "Insufficient stock"
            );
            return Err(CheckoutError::StockUnavailable {
                product_id: item.product_id.clone(),
                requested: item.quantity,
                available: Some(stock.products_number),
            });
        }

        lines.push(PricedLine::new(
            item.product_id.as_str(),
            item.quantity,
            stock.selling_price(),
        )?);
    }

    let priced = PricedCart::from_lines(lines)?;
    debug!(
        receipt_number = %tx.receipt_number(),
        products = priced.lines().len(),
        total_cents = priced.total().cents(),
        "Stock validated"
    );

    Ok(priced)
}

// =============================================================================
// Unit Tests
// =============================================================================
