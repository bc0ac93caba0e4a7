//! # Cart Aggregation and Pricing
//!
//! Turns a submitted cart into something the stock validator can lock and
//! price.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Submitted cart            aggregate()          AggregatedCart          │
//! │  ───────────────           ───────────          ──────────────          │
//! │  { A, 3 }                                       { A, 5 }                │
//! │  { B, 1 }        ───────────────────────►       { B, 1 }                │
//! │  { A, 2 }                                       (sorted by product)     │
//! │                                                                         │
//! │  Locked stock rows         PricedCart::from_lines                       │
//! │  A @ 2.50, B @ 1.00  ──►   [A 5 × 2.50, B 1 × 1.00]  total = 13.50     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A product scanned twice must be checked and decremented once, for the
//! summed quantity. Two separate rows for the same product inside one
//! transaction would each pass the stock check on their own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CheckoutError, CheckoutResult};
use crate::money::Money;

// =============================================================================
// Line Item Request
// =============================================================================

/// One entry of a submitted cart. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

impl LineItemRequest {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        LineItemRequest {
            product_id: product_id.into(),
            quantity,
        }
    }
}

// =============================================================================
// Aggregated Cart
// =============================================================================

/// A product with the total quantity requested across the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedLineItem {
    pub product_id: String,
    pub quantity: i64,
}

/// Immutable result of [`aggregate`]: unique products in ascending id order.
///
/// The ordering is also the order in which stock rows get locked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedCart {
    items: Vec<AggregatedLineItem>,
}

impl AggregatedCart {
    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregatedLineItem> {
        self.items.iter()
    }

    /// Total requested quantity for one product.
    pub fn quantity_of(&self, product_id: &str) -> Option<i64> {
        self.items
            .binary_search_by(|item| item.product_id.as_str().cmp(product_id))
            .ok()
            .and_then(|idx| self.items.get(idx))
            .map(|item| item.quantity)
    }
}

/// Merges duplicate product references into unique (product, quantity) pairs.
///
/// Pure and total: it never fails and never looks at stock. Quantities
/// saturate at `i64::MAX`; such a request can never pass the stock check.
///
/// ## Example
/// ```rust
/// use tally_core::cart::{aggregate, LineItemRequest};
///
/// let cart = aggregate(&[
///     LineItemRequest::new("B", 1),
///     LineItemRequest::new("A", 3),
///     LineItemRequest::new("A", 2),
/// ]);
///
/// let ids: Vec<_> = cart.iter().map(|i| i.product_id.as_str()).collect();
/// assert_eq!(ids, ["A", "B"]);
/// assert_eq!(cart.quantity_of("A"), Some(5));
/// ```
pub fn aggregate(requests: &[LineItemRequest]) -> AggregatedCart {
    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for request in requests {
        let entry = totals.entry(request.product_id.as_str()).or_insert(0);
        *entry = entry.saturating_add(request.quantity);
    }

    AggregatedCart {
        items: totals
            .into_iter()
            .map(|(product_id, quantity)| AggregatedLineItem {
                product_id: product_id.to_string(),
                quantity,
            })
            .collect(),
    }
}

// =============================================================================
// Priced Cart
// =============================================================================

/// An aggregated line with the unit price read from its locked stock row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

impl PricedLine {
    /// Prices one line; overflow is an Internal error.
    pub fn new(product_id: impl Into<String>, quantity: i64, unit_price: Money) -> CheckoutResult<Self> {
        let product_id = product_id.into();
        let line_total = unit_price.checked_mul_quantity(quantity).ok_or_else(|| {
            CheckoutError::internal(format!(
                "line total overflow for {product_id}: {quantity} × {unit_price}"
            ))
        })?;

        Ok(PricedLine {
            product_id,
            quantity,
            unit_price,
            line_total,
        })
    }
}

/// The validated, priced cart: every line has stock and a server-side price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    lines: Vec<PricedLine>,
    total: Money,
}

impl PricedCart {
    /// Sums line totals into the grand total.
    pub fn from_lines(lines: Vec<PricedLine>) -> CheckoutResult<Self> {
        let total = lines
            .iter()
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line.line_total))
            .ok_or_else(|| CheckoutError::internal("receipt total overflow"))?;

        Ok(PricedCart { lines, total })
    }

    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    /// Σ unit price × quantity.
    pub fn total(&self) -> Money {
        self.total
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
