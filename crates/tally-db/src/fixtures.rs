//! Shared fixtures for the inline unit tests.

use chrono::{TimeZone, Utc};
use tally_core::{CheckoutPhase, CheckoutRequest, LineItemRequest, ReceiptMetadata, StockProduct};

use crate::checkout::CheckoutTx;
use crate::pool::{Database, DbConfig};

pub(crate) fn product(id: &str, qty: i64, price_cents: i64) -> StockProduct {
    let now = Utc::now();
    StockProduct {
        product_id: id.to_string(),
        product_name: format!("Product {id}"),
        selling_price_cents: price_cents,
        products_number: qty,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn request(receipt: &str, cashier: &str, items: Vec<LineItemRequest>) -> CheckoutRequest {
    let print_date = Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 0).unwrap();
    CheckoutRequest::new(ReceiptMetadata::new(receipt, cashier, print_date), items).unwrap()
}

/// In-memory database with cashier EMP001 and the given stock.
pub(crate) async fn seeded_db(stock: &[StockProduct]) -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.directory().insert_cashier("EMP001", "Test Cashier").await.unwrap();
    for p in stock {
        db.stock().insert(p).await.unwrap();
    }
    db
}

/// Opens a checkout transaction and walks it to the Validating phase.
pub(crate) async fn validating_tx(db: &Database, receipt: &str) -> CheckoutTx {
    let mut tx = CheckoutTx::begin(db.pool(), receipt).await.unwrap();
    tx.advance(CheckoutPhase::Aggregating).unwrap();
    tx.advance(CheckoutPhase::Validating).unwrap();
    tx
}
