//! End-to-end checkout behavior against a file-backed SQLite database.
//!
//! File-backed because concurrent checkouts need several connections to
//! the same database, which `:memory:` cannot give.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use tally_core::{
    CheckoutError, CheckoutPayload, CheckoutRequest, ErrorKind, LineItemRequest, Money,
    ReceiptMetadata, StockProduct,
};
use tally_db::{Database, DbConfig};
use tempfile::TempDir;

const CASHIER: &str = "EMP001";
const CARD: &str = "1000000000001";
const DEADLINE: Duration = Duration::from_secs(5);

struct TestDb {
    db: Database,
    _dir: TempDir,
}

async fn setup(stock: &[(&str, i64, i64)]) -> TestDb {
    let dir = TempDir::new().unwrap();
    let db = Database::new(DbConfig::new(dir.path().join("tally.db")).max_connections(8))
        .await
        .unwrap();

    db.directory().insert_cashier(CASHIER, "Olena Koval").await.unwrap();
    db.directory().insert_card(CARD, "Taras Bondar", 5).await.unwrap();

    for (id, qty, price) in stock {
        let now = Utc::now();
        db.stock()
            .insert(&StockProduct {
                product_id: id.to_string(),
                product_name: format!("Product {id}"),
                selling_price_cents: *price,
                products_number: *qty,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    TestDb { db, _dir: dir }
}

fn request(receipt: &str, items: &[(&str, i64)]) -> CheckoutRequest {
    request_with(ReceiptMetadata::new(receipt, CASHIER, print_date()), items)
}

fn request_with(meta: ReceiptMetadata, items: &[(&str, i64)]) -> CheckoutRequest {
    let items = items
        .iter()
        .map(|(id, qty)| LineItemRequest::new(*id, *qty))
        .collect();
    CheckoutRequest::new(meta, items).unwrap()
}

fn print_date() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 0).unwrap()
}

async fn on_hand(db: &Database, product_id: &str) -> i64 {
    db.stock().get(product_id).await.unwrap().unwrap().products_number
}

async fn assert_untouched(db: &Database, stock: &[(&str, i64)]) {
    assert_eq!(db.receipts().count().await.unwrap(), 0);
    assert_eq!(db.receipts().count_line_items().await.unwrap(), 0);
    for (id, qty) in stock {
        assert_eq!(on_hand(db, id).await, *qty, "stock of {id} changed");
    }
}

// =============================================================================
// Totals and aggregation
// =============================================================================

#[tokio::test]
async fn total_is_sum_of_line_prices() {
    let t = setup(&[("A", 50, 1099), ("B", 50, 250), ("C", 50, 5)]).await;
    let meta = ReceiptMetadata::new("R-100", CASHIER, print_date()).vat(Money::from_cents(270));

    let receipt = t
        .db
        .checkout(DEADLINE)
        .execute(&request_with(meta, &[("A", 2), ("B", 3), ("C", 7), ("A", 1)]))
        .await
        .unwrap();

    assert_eq!(receipt.total_cents, 3 * 1099 + 3 * 250 + 7 * 5);
    assert_eq!(receipt.vat_cents, 270);

    let lines = t.db.receipts().line_items("R-100").await.unwrap();
    let line_sum: Money = lines.iter().map(|l| l.line_total()).sum();
    assert_eq!(line_sum, receipt.total());
    assert_eq!(t.db.receipts().get("R-100").await.unwrap(), Some(receipt));
}

#[tokio::test]
async fn duplicate_lines_are_one_line_item() {
    let t = setup(&[("A", 5, 100)]).await;

    t.db.checkout(DEADLINE)
        .execute(&request("R-1", &[("A", 3), ("A", 2)]))
        .await
        .unwrap();

    let lines = t.db.receipts().line_items("R-1").await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 5);
    assert_eq!(on_hand(&t.db, "A").await, 0);
}

#[tokio::test]
async fn aggregated_shortfall_has_no_side_effects() {
    let t = setup(&[("A", 4, 100)]).await;

    let err = t
        .db
        .checkout(DEADLINE)
        .execute(&request("R-1", &[("A", 3), ("A", 2)]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        CheckoutError::StockUnavailable {
            product_id: "A".into(),
            requested: 5,
            available: Some(4),
        }
    );
    assert_untouched(&t.db, &[("A", 4)]).await;
}

#[tokio::test]
async fn single_line_decrements_stock() {
    let t = setup(&[("A", 10, 100)]).await;

    let receipt = t
        .db
        .checkout(DEADLINE)
        .execute(&request("R-1", &[("A", 4)]))
        .await
        .unwrap();

    assert_eq!(on_hand(&t.db, "A").await, 6);
    let lines = t.db.receipts().line_items("R-1").await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 4);
    assert_eq!(lines[0].unit_price_cents, 100);
    assert_eq!(lines[0].sold_at, receipt.print_date);
}

#[tokio::test]
async fn price_comes_from_stock_row() {
    let t = setup(&[("A", 10, 4250)]).await;

    let payload: CheckoutPayload = serde_json::from_value(serde_json::json!({
        "receipt_number": "R-7",
        "cashier_id": CASHIER,
        "card_number": CARD,
        "print_date": "2025-03-01T12:15:00+02:00",
        "vat_cents": 850,
        "products": [{ "product_id": "A", "quantity": 1 }]
    }))
    .unwrap();
    let request = CheckoutRequest::try_from(payload).unwrap();

    let receipt = t.db.checkout(DEADLINE).execute(&request).await.unwrap();

    assert_eq!(receipt.total_cents, 4250);
    assert_eq!(receipt.card_number.as_deref(), Some(CARD));
    assert_eq!(receipt.print_date, print_date());
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn missing_product_is_stock_unavailable() {
    let t = setup(&[("A", 10, 100)]).await;

    let err = t
        .db
        .checkout(DEADLINE)
        .execute(&request("R-1", &[("A", 1), ("GHOST", 1)]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StockUnavailable);
    assert!(matches!(
        err,
        CheckoutError::StockUnavailable { ref product_id, available: None, .. } if product_id == "GHOST"
    ));
    assert_untouched(&t.db, &[("A", 10)]).await;
}

#[tokio::test]
async fn duplicate_receipt_number_conflicts() {
    let t = setup(&[("A", 10, 100), ("B", 10, 100)]).await;
    let service = t.db.checkout(DEADLINE);

    service.execute(&request("R-1", &[("A", 2)])).await.unwrap();
    let err = service
        .execute(&request("R-1", &[("B", 3)]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        CheckoutError::Conflict {
            receipt_number: "R-1".into()
        }
    );
    assert_eq!(t.db.receipts().count().await.unwrap(), 1);
    assert_eq!(t.db.receipts().count_line_items().await.unwrap(), 1);
    assert_eq!(on_hand(&t.db, "A").await, 8);
    assert_eq!(on_hand(&t.db, "B").await, 10);
}

#[tokio::test]
async fn unknown_cashier_is_reference_error() {
    let t = setup(&[("A", 10, 100)]).await;
    let meta = ReceiptMetadata::new("R-1", "NOBODY", print_date());

    let err = t
        .db
        .checkout(DEADLINE)
        .execute(&request_with(meta, &[("A", 1)]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ReferenceError);
    assert_untouched(&t.db, &[("A", 10)]).await;
}

#[tokio::test]
async fn unknown_card_is_reference_error() {
    let t = setup(&[("A", 10, 100)]).await;
    let meta = ReceiptMetadata::new("R-1", CASHIER, print_date()).card_number("9999999999999");

    let err = t
        .db
        .checkout(DEADLINE)
        .execute(&request_with(meta, &[("A", 1)]))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        CheckoutError::ReferenceError {
            reference: "cashier EMP001 or card 9999999999999".into()
        }
    );
    assert_untouched(&t.db, &[("A", 10)]).await;
}

#[tokio::test]
async fn deadline_rolls_back() {
    let t = setup(&[("A", 10, 100)]).await;

    // Hold the write lock so the checkout waits in the busy handler
    let mut blocker = t.db.pool().begin().await.unwrap();
    sqlx::query("UPDATE store_products SET products_number = products_number WHERE product_id = ?1")
        .bind("A")
        .execute(&mut *blocker)
        .await
        .unwrap();

    let err = t
        .db
        .checkout(Duration::from_millis(200))
        .execute(&request("R-1", &[("A", 4)]))
        .await
        .unwrap_err();

    assert_eq!(err, CheckoutError::Timeout(Duration::from_millis(200)));
    assert_eq!(err.kind(), ErrorKind::Internal);

    blocker.rollback().await.unwrap();
    assert_untouched(&t.db, &[("A", 10)]).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn timeout_is_never_reported_for_a_committed_checkout() {
    const STOCK: i64 = 10_000;
    let t = setup(&[("A", STOCK, 100)]).await;

    let mut committed = Vec::new();
    let mut timed_out = Vec::new();

    // Deadlines short enough to expire at every step, COMMIT included
    for i in 0..400u64 {
        let receipt = format!("R-{i}");
        let deadline = Duration::from_micros(100 + (i % 40) * 50);

        match t.db.checkout(deadline).execute(&request(&receipt, &[("A", 1)])).await {
            Ok(_) => committed.push(receipt),
            Err(CheckoutError::Timeout(_)) => timed_out.push(receipt),
            Err(other) => panic!("{receipt}: unexpected {other:?}"),
        }
    }

    for receipt in &timed_out {
        assert_eq!(
            t.db.receipts().get(receipt).await.unwrap(),
            None,
            "{receipt} reported Timeout but was persisted"
        );
    }
    assert_eq!(t.db.receipts().count().await.unwrap(), committed.len() as i64);
    assert_eq!(on_hand(&t.db, "A").await, STOCK - committed.len() as i64);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_never_oversell() {
    let t = setup(&[("A", 10, 100)]).await;

    let first = tokio::spawn({
        let service = t.db.checkout(DEADLINE);
        async move { service.execute(&request("R-1", &[("A", 6)])).await }
    });
    let second = tokio::spawn({
        let service = t.db.checkout(DEADLINE);
        async move { service.execute(&request("R-2", &[("A", 6)])).await }
    });

    let results = [first.await.unwrap(), second.await.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let failure = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(
        failure,
        &CheckoutError::StockUnavailable {
            product_id: "A".into(),
            requested: 6,
            available: Some(4),
        }
    );
    assert_eq!(on_hand(&t.db, "A").await, 4);
    assert_eq!(t.db.receipts().count().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_concurrent_checkouts_sell_exactly_the_stock() {
    let t = setup(&[("A", 10, 100), ("B", 100, 50)]).await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = t.db.checkout(DEADLINE);
            // Mixed line order across requests: locks are still taken in product order
            let items: &[(&str, i64)] = if i % 2 == 0 {
                &[("A", 3), ("B", 1)]
            } else {
                &[("B", 1), ("A", 3)]
            };
            let req = request(&format!("R-{i}"), items);
            tokio::spawn(async move { service.execute(&req).await })
        })
        .collect();

    let mut committed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => committed += 1,
            Err(err) => assert_eq!(err.kind(), ErrorKind::StockUnavailable),
        }
    }

    assert_eq!(committed, 3);
    assert_eq!(on_hand(&t.db, "A").await, 1);
    assert_eq!(on_hand(&t.db, "B").await, 97);
    assert_eq!(t.db.receipts().count().await.unwrap(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disjoint_products_both_succeed() {
    let t = setup(&[("A", 5, 100), ("B", 5, 100)]).await;

    let a = tokio::spawn({
        let service = t.db.checkout(DEADLINE);
        async move { service.execute(&request("R-A", &[("A", 5)])).await }
    });
    let b = tokio::spawn({
        let service = t.db.checkout(DEADLINE);
        async move { service.execute(&request("R-B", &[("B", 5)])).await }
    });

    assert!(a.await.unwrap().is_ok());
    assert!(b.await.unwrap().is_ok());
    assert_eq!(on_hand(&t.db, "A").await, 0);
    assert_eq!(on_hand(&t.db, "B").await, 0);
}
