//! # Checkout Request
//!
//! The validated input of one checkout attempt, and the phases it moves
//! through.
//!
//! ## Phase Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Received ──► Aggregating ──► Validating ──► Writing ──► Committed     │
//! │                                    │            │                       │
//! │                                    └────────────┴──────► RolledBack    │
//! │                                                                         │
//! │  There is no partial-success state.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::LineItemRequest;
use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    parse_print_date, validate_card_number, validate_cart, validate_cashier_id,
    validate_receipt_number, validate_vat_cents, ValidationResult,
};

// =============================================================================
// Wire Payload
// =============================================================================

/// Checkout input as submitted by the HTTP layer.
///
/// ## JSON
/// ```json
/// {
///   "receipt_number": "R-000042",
///   "cashier_id": "EMP001",
///   "card_number": null,
///   "print_date": "2025-03-01T10:15:00Z",
///   "vat_cents": 270,
///   "products": [{ "product_id": "4820000123", "quantity": 2 }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutPayload {
    pub receipt_number: String,
    pub cashier_id: String,
    #[serde(default)]
    pub card_number: Option<String>,
    /// RFC 3339 date-time.
    pub print_date: String,
    pub vat_cents: i64,
    pub products: Vec<LineItemRequest>,
}

// =============================================================================
// Receipt Metadata
// =============================================================================

/// Everything on the receipt header that the caller supplies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptMetadata {
    pub receipt_number: String,
    pub cashier_id: String,
    pub card_number: Option<String>,
    pub print_date: DateTime<Utc>,
    pub vat: Money,
}

impl ReceiptMetadata {
    /// Creates metadata without a customer card and zero VAT.
    pub fn new(
        receipt_number: impl Into<String>,
        cashier_id: impl Into<String>,
        print_date: DateTime<Utc>,
    ) -> Self {
        ReceiptMetadata {
            receipt_number: receipt_number.into(),
            cashier_id: cashier_id.into(),
            card_number: None,
            print_date,
            vat: Money::zero(),
        }
    }

    /// Sets the customer card.
    pub fn card_number(mut self, card_number: impl Into<String>) -> Self {
        self.card_number = Some(card_number.into());
        self
    }

    /// Sets the VAT amount.
    pub fn vat(mut self, vat: Money) -> Self {
        self.vat = vat;
        self
    }
}

// =============================================================================
// Checkout Request
// =============================================================================

/// A checkout attempt that passed boundary validation.
///
/// Construction is the only place input is checked; the checkout engine
/// trusts every `CheckoutRequest` it receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    metadata: ReceiptMetadata,
    items: Vec<LineItemRequest>,
}

impl CheckoutRequest {
    /// Validates and builds a request.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use tally_core::{CheckoutRequest, LineItemRequest, ReceiptMetadata};
    ///
    /// let meta = ReceiptMetadata::new("R-1", "EMP001", Utc::now());
    /// let request = CheckoutRequest::new(meta, vec![LineItemRequest::new("A", 2)]);
    /// assert!(request.is_ok());
    ///
    /// let meta = ReceiptMetadata::new("R-1", "EMP001", Utc::now());
    /// assert!(CheckoutRequest::new(meta, vec![]).is_err());
    /// ```
    pub fn new(metadata: ReceiptMetadata, items: Vec<LineItemRequest>) -> ValidationResult<Self> {
        let metadata = ReceiptMetadata {
            receipt_number: metadata.receipt_number.trim().to_string(),
            cashier_id: metadata.cashier_id.trim().to_string(),
            card_number: metadata
                .card_number
                .map(|card| card.trim().to_string())
                .filter(|card| !card.is_empty()),
            ..metadata
        };
        let items: Vec<LineItemRequest> = items
            .into_iter()
            .map(|item| LineItemRequest::new(item.product_id.trim(), item.quantity))
            .collect();

        validate_receipt_number(&metadata.receipt_number)?;
        validate_cashier_id(&metadata.cashier_id)?;
        if let Some(card) = &metadata.card_number {
            validate_card_number(card)?;
        }
        validate_vat_cents(metadata.vat.cents())?;
        validate_cart(&items)?;

        Ok(CheckoutRequest { metadata, items })
    }

    pub fn metadata(&self) -> &ReceiptMetadata {
        &self.metadata
    }

    pub fn receipt_number(&self) -> &str {
        &self.metadata.receipt_number
    }

    /// The submitted lines, duplicates included.
    pub fn items(&self) -> &[LineItemRequest] {
        &self.items
    }
}

impl TryFrom<CheckoutPayload> for CheckoutRequest {
    type Error = ValidationError;

    fn try_from(payload: CheckoutPayload) -> Result<Self, Self::Error> {
        let metadata = ReceiptMetadata {
            receipt_number: payload.receipt_number,
            cashier_id: payload.cashier_id,
            card_number: payload.card_number,
            print_date: parse_print_date(&payload.print_date)?,
            vat: Money::from_cents(payload.vat_cents),
        };

        CheckoutRequest::new(metadata, payload.products)
    }
}

// =============================================================================
// Checkout Phase
// =============================================================================

/// Where a checkout attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutPhase {
    Received,
    Aggregating,
    Validating,
    Writing,
    Committed,
    RolledBack,
}

impl CheckoutPhase {
    /// Committed and RolledBack end the attempt.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, CheckoutPhase::Committed | CheckoutPhase::RolledBack)
    }

    /// Checks whether `next` is a legal successor of this phase.
    ///
    /// Any phase short of a terminal one may roll back; only Writing may
    /// commit.
    pub const fn can_advance_to(&self, next: CheckoutPhase) -> bool {
        use CheckoutPhase::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Received, Aggregating)
                | (Aggregating, Validating)
                | (Validating, Writing)
                | (Writing, Committed)
                | (_, RolledBack)
        )
    }
}

impl fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutPhase::Received => "received",
            CheckoutPhase::Aggregating => "aggregating",
            CheckoutPhase::Validating => "validating",
            CheckoutPhase::Writing => "writing",
            CheckoutPhase::Committed => "committed",
            CheckoutPhase::RolledBack => "rolled_back",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
