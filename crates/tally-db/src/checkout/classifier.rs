//! # Error Classifier
//!
//! Maps a storage failure plus the step it happened at onto the four
//! checkout outcomes.
//!
//! ## Priority
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbError                  Failure site                 CheckoutError    │
//! │  ───────                  ────────────                 ─────────────    │
//! │  UniqueViolation     ×    receipt / line insert   ──►  Conflict         │
//! │  ForeignKeyViolation ×    any                     ──►  ReferenceError   │
//! │  CheckViolation      ×    stock decrement         ──►  StockUnavailable │
//! │  anything else                                    ──►  Internal         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure: no logging, no retries.

use std::fmt;

use tally_core::CheckoutError;

use crate::error::DbError;

/// The checkout step a storage call belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSite<'a> {
    /// Acquiring a connection and opening the transaction.
    Begin,

    /// Reading and locking one stock row.
    LockStock { product_id: &'a str, requested: i64 },

    /// Inserting the receipt header.
    InsertReceipt {
        receipt_number: &'a str,
        cashier_id: &'a str,
        card_number: Option<&'a str>,
    },

    /// Inserting one receipt line.
    InsertLineItem {
        receipt_number: &'a str,
        product_id: &'a str,
    },

    /// Decrementing one stock row.
    DecrementStock { product_id: &'a str, requested: i64 },

    Commit,
}

impl fmt::Display for FailureSite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureSite::Begin => f.write_str("begin"),
            FailureSite::LockStock { product_id, .. } => write!(f, "lock stock {product_id}"),
            FailureSite::InsertReceipt { receipt_number, .. } => {
                write!(f, "insert receipt {receipt_number}")
            }
            FailureSite::InsertLineItem { product_id, .. } => {
                write!(f, "insert line item {product_id}")
            }
            FailureSite::DecrementStock { product_id, .. } => {
                write!(f, "decrement stock {product_id}")
            }
            FailureSite::Commit => f.write_str("commit"),
        }
    }
}

/// Translates a storage failure into the checkout error taxonomy.
///
/// ## Example
/// ```rust
/// use tally_core::ErrorKind;
/// use tally_db::checkout::classifier::{classify, FailureSite};
/// use tally_db::DbError;
///
/// let err = classify(
///     DbError::UniqueViolation { message: "receipts.receipt_number".into() },
///     FailureSite::InsertReceipt { receipt_number: "R-1", cashier_id: "EMP001", card_number: None },
/// );
/// assert_eq!(err.kind(), ErrorKind::Conflict);
/// ```
pub fn classify(err: DbError, site: FailureSite<'_>) -> CheckoutError {
    match (err, site) {
        (
            DbError::UniqueViolation { .. },
            FailureSite::InsertReceipt { receipt_number, .. }
            | FailureSite::InsertLineItem { receipt_number, .. },
        ) => CheckoutError::Conflict {
            receipt_number: receipt_number.to_string(),
        },

        (DbError::ForeignKeyViolation { message }, site) => CheckoutError::ReferenceError {
            reference: reference_hint(site).unwrap_or(message),
        },

        (
            DbError::CheckViolation { .. },
            FailureSite::DecrementStock {
                product_id,
                requested,
            },
        ) => CheckoutError::StockUnavailable {
            product_id: product_id.to_string(),
            requested,
            available: None,
        },

        (err, site) => CheckoutError::internal(format!("{site}: {err}")),
    }
}

/// SQLite does not say which foreign key failed; name what the step
/// referenced.
fn reference_hint(site: FailureSite<'_>) -> Option<String> {
    match site {
        FailureSite::InsertReceipt {
            cashier_id,
            card_number: Some(card),
            ..
        } => Some(format!("cashier {cashier_id} or card {card}")),
        FailureSite::InsertReceipt { cashier_id, .. } => Some(format!("cashier {cashier_id}")),
        FailureSite::InsertLineItem { product_id, .. }
        | FailureSite::LockStock { product_id, .. }
        | FailureSite::DecrementStock { product_id, .. } => Some(format!("product {product_id}")),
        FailureSite::Begin | FailureSite::Commit => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::ErrorKind;

    const RECEIPT: FailureSite<'static> = FailureSite::InsertReceipt {
        receipt_number: "R-7",
        cashier_id: "EMP001",
        card_number: None,
    };

    fn unique() -> DbError {
        DbError::UniqueViolation {
            message: "UNIQUE constraint failed: receipts.receipt_number".into(),
        }
    }

    fn foreign_key() -> DbError {
        DbError::ForeignKeyViolation {
            message: "FOREIGN KEY constraint failed".into(),
        }
    }

    fn check() -> DbError {
        DbError::CheckViolation {
            message: "CHECK constraint failed: products_number >= 0".into(),
        }
    }

    #[test]
    fn test_duplicate_receipt_is_conflict() {
        assert_eq!(
            classify(unique(), RECEIPT),
            CheckoutError::Conflict {
                receipt_number: "R-7".into()
            }
        );
    }

    #[test]
    fn test_foreign_key_names_reference() {
        assert_eq!(
            classify(foreign_key(), RECEIPT),
            CheckoutError::ReferenceError {
                reference: "cashier EMP001".into()
            }
        );

        let with_card = FailureSite::InsertReceipt {
            receipt_number: "R-7",
            cashier_id: "EMP001",
            card_number: Some("1111"),
        };
        assert_eq!(
            classify(foreign_key(), with_card),
            CheckoutError::ReferenceError {
                reference: "cashier EMP001 or card 1111".into()
            }
        );

        let line = FailureSite::InsertLineItem {
            receipt_number: "R-7",
            product_id: "A",
        };
        assert_eq!(classify(foreign_key(), line).kind(), ErrorKind::ReferenceError);
        assert_eq!(
            classify(foreign_key(), FailureSite::Commit),
            CheckoutError::ReferenceError {
                reference: "FOREIGN KEY constraint failed".into()
            }
        );
    }

    #[test]
    fn test_check_on_decrement_is_stock_unavailable() {
        let site = FailureSite::DecrementStock {
            product_id: "A",
            requested: 5,
        };
        assert_eq!(
            classify(check(), site),
            CheckoutError::StockUnavailable {
                product_id: "A".into(),
                requested: 5,
                available: None
            }
        );

        // The same violation on the receipt insert is a bug, not a stock problem
        assert_eq!(classify(check(), RECEIPT).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_everything_else_is_internal() {
        let err = classify(DbError::PoolExhausted, FailureSite::Begin);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("begin"));

        let lock = FailureSite::LockStock {
            product_id: "A",
            requested: 1,
        };
        assert_eq!(
            classify(DbError::QueryFailed("database is locked".into()), lock).kind(),
            ErrorKind::Internal
        );
        assert_eq!(classify(unique(), lock).kind(), ErrorKind::Internal);
        // A missing row at the lock is handled by the validator, not here
        assert_eq!(
            classify(DbError::from(sqlx::Error::RowNotFound), lock).kind(),
            ErrorKind::Internal
        );
    }
}
