//! # Domain Types
//!
//! Persisted entities touched by checkout.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  StockProduct   │   │     Receipt     │   │ ReceiptLineItem │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │   │  receipt_number │◄──│  receipt_number │       │
//! │  │  products_number│   │  cashier_id     │   │  product_id     │       │
//! │  │  price_cents    │   │  total_cents    │   │  quantity       │       │
//! │  └─────────────────┘   │  vat_cents      │   │  unit_price     │       │
//! │          ▲             └─────────────────┘   └────────┬────────┘       │
//! │          └────────────────────────────────────────────┘                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Receipts and their line items are written once by checkout and never
//! updated. Stock rows are decremented in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Stock Product
// =============================================================================

/// An inventory record: how many units are on hand and what they sell for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockProduct {
    /// Product identifier (UPC-style business key).
    pub product_id: String,

    /// Display name, for seed data and receipts.
    pub product_name: String,

    /// Current selling price in cents.
    pub selling_price_cents: i64,

    /// Units available. Never negative.
    pub products_number: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl StockProduct {
    /// Returns the selling price as Money.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// Checks if `quantity` units can be sold from this row.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.products_number >= quantity
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// A persisted record of one completed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Receipt {
    pub receipt_number: String,
    pub cashier_id: String,
    pub card_number: Option<String>,
    #[ts(as = "String")]
    pub print_date: DateTime<Utc>,
    /// Σ unit price × quantity over the line items, computed server-side.
    pub total_cents: i64,
    /// VAT as supplied by the caller.
    pub vat_cents: i64,
}

impl Receipt {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the VAT as Money.
    #[inline]
    pub fn vat(&self) -> Money {
        Money::from_cents(self.vat_cents)
    }
}

// =============================================================================
// Receipt Line Item
// =============================================================================

/// One product entry on a receipt, price frozen at sale time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ReceiptLineItem {
    pub id: String,
    pub receipt_number: String,
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
}

impl ReceiptLineItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns unit price × quantity.
    ///
    /// Stored rows passed the same checked multiplication at checkout,
    /// so this cannot overflow for persisted data.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents * self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(qty: i64) -> StockProduct {
        let now = Utc::now();
        StockProduct {
            product_id: "A".to_string(),
            product_name: "Apple juice".to_string(),
            selling_price_cents: 250,
            products_number: qty,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_can_sell() {
        assert!(stock(4).can_sell(4));
        assert!(!stock(4).can_sell(5));
        assert!(stock(0).can_sell(0));
    }

    #[test]
    fn test_line_total() {
        let item = ReceiptLineItem {
            id: "1".to_string(),
            receipt_number: "R1".to_string(),
            product_id: "A".to_string(),
            quantity: 4,
            unit_price_cents: 250,
            sold_at: Utc::now(),
        };
        assert_eq!(item.line_total().cents(), 1000);
        assert_eq!(item.unit_price(), stock(1).selling_price());
    }
}
