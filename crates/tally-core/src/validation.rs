//! # Validation Module
//!
//! Boundary validation for checkout input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP layer (collaborator)                                    │
//! │  └── Deserialization into CheckoutPayload                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Lengths, character sets, quantity and VAT bounds                  │
//! │  └── RFC 3339 print date                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Checkout transaction (tally-db)                              │
//! │  ├── Stock existence and sufficiency (locked)                          │
//! │  ├── UNIQUE receipt number                                             │
//! │  └── Foreign keys (cashier, card, product)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_product_id, validate_quantity};
//!
//! validate_product_id("4820000123").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use chrono::{DateTime, Utc};

use crate::cart::LineItemRequest;
use crate::error::ValidationError;
use crate::{
    MAX_CARD_NUMBER_LEN, MAX_CART_ITEMS, MAX_CASHIER_ID_LEN, MAX_ITEM_QUANTITY,
    MAX_PRODUCT_ID_LEN, MAX_RECEIPT_NUMBER_LEN, MAX_VAT_CENTS,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Checks a business identifier: non-empty, bounded, `[A-Za-z0-9_-]`.
fn validate_identifier(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product identifier.
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_product_id;
///
/// assert!(validate_product_id("COKE-330").is_ok());
/// assert!(validate_product_id("").is_err());
/// assert!(validate_product_id("1234567890123").is_err()); // 13 > 12
/// ```
pub fn validate_product_id(product_id: &str) -> ValidationResult<()> {
    validate_identifier("product_id", product_id, MAX_PRODUCT_ID_LEN)
}

/// Validates a receipt number (1 to 10 characters).
pub fn validate_receipt_number(receipt_number: &str) -> ValidationResult<()> {
    validate_identifier("receipt_number", receipt_number, MAX_RECEIPT_NUMBER_LEN)
}

/// Validates a cashier identifier (1 to 10 characters).
pub fn validate_cashier_id(cashier_id: &str) -> ValidationResult<()> {
    validate_identifier("cashier_id", cashier_id, MAX_CASHIER_ID_LEN)
}

/// Validates a customer card number (1 to 13 characters).
pub fn validate_card_number(card_number: &str) -> ValidationResult<()> {
    validate_identifier("card_number", card_number, MAX_CARD_NUMBER_LEN)
}

/// Parses an RFC 3339 print date into UTC.
///
/// ## Example
/// ```rust
/// use tally_core::validation::parse_print_date;
///
/// let ts = parse_print_date("2025-03-01T10:15:00+02:00").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2025-03-01T08:15:00+00:00");
/// assert!(parse_print_date("2025-03-01").is_err());
/// ```
pub fn parse_print_date(value: &str) -> ValidationResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| ValidationError::InvalidFormat {
            field: "print_date".to_string(),
            reason: format!("must be RFC 3339 ({e})"),
        })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity on one request line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates VAT in cents: 0 to MAX_VAT_CENTS inclusive.
pub fn validate_vat_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_VAT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "vat".to_string(),
            min: 0,
            max: MAX_VAT_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the submitted cart as a whole.
///
/// ## Rules
/// - At least one line, at most MAX_CART_ITEMS (100)
/// - Every line has a valid product id and quantity
pub fn validate_cart(items: &[LineItemRequest]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "products".to_string(),
        });
    }

    if items.len() > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "products".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }

    for item in items {
        validate_product_id(&item.product_id)?;
        validate_quantity(item.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("4820000123").is_ok());
        assert!(validate_product_id("COKE_330").is_ok());

        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("   ").is_err());
        assert!(validate_product_id("has space").is_err());
        assert!(validate_product_id(&"A".repeat(13)).is_err());
    }

    #[test]
    fn test_identifier_bounds() {
        assert!(validate_receipt_number(&"R".repeat(10)).is_ok());
        assert!(validate_receipt_number(&"R".repeat(11)).is_err());
        assert!(validate_cashier_id("EMP001").is_ok());
        assert!(validate_card_number(&"9".repeat(13)).is_ok());
        assert!(matches!(
            validate_card_number(&"9".repeat(14)),
            Err(ValidationError::TooLong { max: 13, .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_vat() {
        assert!(validate_vat_cents(0).is_ok());
        assert!(validate_vat_cents(MAX_VAT_CENTS).is_ok());
        assert!(validate_vat_cents(-1).is_err());
        assert!(validate_vat_cents(MAX_VAT_CENTS + 1).is_err());
    }

    #[test]
    fn test_parse_print_date() {
        assert!(parse_print_date("2025-03-01T10:15:00Z").is_ok());
        assert!(parse_print_date("not a date").is_err());
        assert!(parse_print_date("2025-13-01T10:15:00Z").is_err());
    }

    #[test]
    fn test_validate_cart() {
        assert!(validate_cart(&[LineItemRequest::new("A", 1)]).is_ok());
        assert!(matches!(
            validate_cart(&[]),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_cart(&[LineItemRequest::new("A", 0)]).is_err());

        let too_many: Vec<_> = (0..=MAX_CART_ITEMS)
            .map(|i| LineItemRequest::new(format!("P{i}"), 1))
            .collect();
        assert!(validate_cart(&too_many).is_err());
    }
}
