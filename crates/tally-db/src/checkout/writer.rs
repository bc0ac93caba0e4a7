//! Write phase of checkout: receipt header, one line per product, stock
//! decrements. Runs on the same transaction that validated the cart.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use tally_core::{CheckoutError, CheckoutRequest, CheckoutResult, PricedCart, Receipt};

use super::classifier::{classify, FailureSite};
use super::CheckoutTx;

/// Persists the receipt for an already validated and priced cart.
///
/// The receipt total is the priced cart's total; nothing client-supplied
/// other than VAT ends up in a money column.
pub async fn write_receipt(
    tx: &mut CheckoutTx,
    request: &CheckoutRequest,
    priced: &PricedCart,
) -> CheckoutResult<Receipt> {
    let meta = request.metadata();
    let receipt = Receipt {
        receipt_number: meta.receipt_number.clone(),
        cashier_id: meta.cashier_id.clone(),
        card_number: meta.card_number.clone(),
        print_date: meta.print_date,
        total_cents: priced.total().cents(),
        vat_cents: meta.vat.cents(),
    };

    sqlx::query(
        r#"
        INSERT INTO receipts (
            receipt_number, cashier_id, card_number, print_date, total_cents, vat_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&receipt.receipt_number)
    .bind(&receipt.cashier_id)
    .bind(&receipt.card_number)
    .bind(receipt.print_date)
    .bind(receipt.total_cents)
    .bind(receipt.vat_cents)
    .execute(tx.conn())
    .await
    .map_err(|e| {
        classify(
            e.into(),
            FailureSite::InsertReceipt {
                receipt_number: &receipt.receipt_number,
                cashier_id: &receipt.cashier_id,
                card_number: receipt.card_number.as_deref(),
            },
        )
    })?;

    debug!(receipt_number = %receipt.receipt_number, "Receipt header inserted");

    for line in priced.lines() {
        sqlx::query(
            r#"
            INSERT INTO receipt_line_items (
                id, receipt_number, product_id, quantity, unit_price_cents, sold_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&receipt.receipt_number)
        .bind(&line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price.cents())
        .bind(receipt.print_date)
        .execute(tx.conn())
        .await
        .map_err(|e| {
            classify(
                e.into(),
                FailureSite::InsertLineItem {
                    receipt_number: &receipt.receipt_number,
                    product_id: &line.product_id,
                },
            )
        })?;
    }

    for line in priced.lines() {
        let site = FailureSite::DecrementStock {
            product_id: &line.product_id,
            requested: line.quantity,
        };

        // Guarded: never takes a row below zero even if the lock were lost
        let result = sqlx::query(
            r#"
            UPDATE store_products
            SET products_number = products_number - ?2,
                updated_at = ?3
            WHERE product_id = ?1 AND products_number >= ?2
            "#,
        )
        .bind(&line.product_id)
        .bind(line.quantity)
        .bind(Utc::now())
        .execute(tx.conn())
        .await
        .map_err(|e| classify(e.into(), site))?;

        if result.rows_affected() == 0 {
            return Err(CheckoutError::StockUnavailable {
                product_id: line.product_id.clone(),
                requested: line.quantity,
                available: None,
            });
        }

        debug!(product_id = %line.product_id, quantity = line.quantity, "Stock decremented");
    }

    Ok(receipt)
}

// =============================================================================
// Unit Tests
// =============================================================================
