//! # Repository Module
//!
//! Pool-level reads and fixture writes outside the checkout transaction.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.stock()      ──► StockRepository      store_products               │
//! │  db.receipts()   ──► ReceiptRepository    receipts, receipt_line_items │
//! │  db.directory()  ──► DirectoryRepository  employees, customer_cards    │
//! │                                                                         │
//! │  db.checkout(t)  ──► CheckoutService      (all of the above, one tx)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checkout never goes through these repositories: its statements must run
//! on the transaction's own connection, so they live in
//! [`crate::checkout`].

pub mod directory;
pub mod receipt;
pub mod stock;
