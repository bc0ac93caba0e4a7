//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── ValidationError  - Boundary input failures (before checkout)      │
//! │  └── CheckoutError    - The classified outcome of a failed checkout    │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError          - Tagged storage failures                        │
//! │                                                                         │
//! │  Flow: sqlx::Error → DbError → classify() → CheckoutError → caller     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers never see storage codes: they match on [`CheckoutError`] or on
//! its coarse [`ErrorKind`].

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Checkout Error
// =============================================================================

/// The single classified error a failed checkout surfaces.
///
/// Every variant means the transaction was rolled back: no receipt, no line
/// items and no stock change persist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The receipt number is already taken.
    #[error("Receipt {receipt_number} already exists")]
    Conflict { receipt_number: String },

    /// A referenced cashier, card or product does not exist.
    #[error("Referenced record does not exist: {reference}")]
    ReferenceError { reference: String },

    /// A product is missing from stock or has too few units.
    ///
    /// `available` is `None` when the product row does not exist at all.
    #[error("Stock unavailable for {product_id}: requested {requested}")]
    StockUnavailable {
        product_id: String,
        requested: i64,
        available: Option<i64>,
    },

    /// The checkout did not finish within its deadline.
    #[error("Checkout timed out after {0:?}")]
    Timeout(Duration),

    /// Anything else: connectivity loss, arithmetic overflow, driver errors.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CheckoutError {
    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        CheckoutError::Internal {
            message: message.into(),
        }
    }

    /// Returns the coarse kind used by the calling layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::Conflict { .. } => ErrorKind::Conflict,
            CheckoutError::ReferenceError { .. } => ErrorKind::ReferenceError,
            CheckoutError::StockUnavailable { .. } => ErrorKind::StockUnavailable,
            CheckoutError::Timeout(_) | CheckoutError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Checks if this error came from the checkout deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CheckoutError::Timeout(_))
    }
}

/// Convenience type alias for checkout results.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Error Kind
// =============================================================================

/// The four outcomes a failed checkout can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Conflict,
    ReferenceError,
    StockUnavailable,
    Internal,
}

impl ErrorKind {
    /// Conventional HTTP status for this kind.
    ///
    /// Only a hint: the HTTP layer owns the final mapping.
    pub const fn suggested_status(&self) -> u16 {
        match self {
            ErrorKind::Conflict => 409,
            ErrorKind::ReferenceError => 400,
            ErrorKind::StockUnavailable => 422,
            ErrorKind::Internal => 500,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised while turning a [`crate::CheckoutPayload`] into a
/// [`crate::CheckoutRequest`], before any transaction is opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid characters, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================
