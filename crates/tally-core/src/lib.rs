//! # tally-core: Pure Checkout Logic for Tally POS
//!
//! This crate holds everything about checkout that can be decided without
//! touching storage: cart aggregation, pricing, input validation and the
//! error taxonomy handed back to callers.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Checkout                               │
//! │                                                                         │
//! │  HTTP layer (collaborator) ── CheckoutPayload (JSON)                   │
//! │                                │                                        │
//! │                                ▼ CheckoutRequest::try_from             │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │   money   │  │ checkout  │  │   error   │  │   │
//! │  │   │ aggregate │  │   Money   │  │  Request  │  │ Checkout  │  │   │
//! │  │   │ PricedCart│  │           │  │   Phase   │  │  Error    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Database Layer)                    │   │
//! │  │        StockValidator, CheckoutService, ErrorClassifier         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - Line item aggregation and pricing
//! - [`checkout`] - Validated checkout request and phase machine
//! - [`types`] - Persisted entities (StockProduct, Receipt, ReceiptLineItem)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Checkout and validation errors
//! - [`validation`] - Boundary input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::cart::{aggregate, LineItemRequest};
//!
//! // The same product scanned twice is validated as one line
//! let cart = aggregate(&[
//!     LineItemRequest::new("A", 3),
//!     LineItemRequest::new("A", 2),
//! ]);
//!
//! assert_eq!(cart.len(), 1);
//! assert_eq!(cart.quantity_of("A"), Some(5));
//! ```

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

pub use cart::{aggregate, AggregatedCart, AggregatedLineItem, LineItemRequest, PricedCart, PricedLine};
pub use checkout::{CheckoutPayload, CheckoutPhase, CheckoutRequest, ReceiptMetadata};
pub use error::{CheckoutError, CheckoutResult, ErrorKind, ValidationError};
pub use money::Money;
pub use types::{Receipt, ReceiptLineItem, StockProduct};

// =============================================================================
// Boundary Limits
// =============================================================================

/// Maximum request lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity on a single request line.
///
/// Aggregated quantities may exceed this when a product is scanned repeatedly.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of a product identifier.
pub const MAX_PRODUCT_ID_LEN: usize = 12;

/// Maximum length of a receipt number.
pub const MAX_RECEIPT_NUMBER_LEN: usize = 10;

/// Maximum length of a cashier identifier.
pub const MAX_CASHIER_ID_LEN: usize = 10;

/// Maximum length of a customer card number.
pub const MAX_CARD_NUMBER_LEN: usize = 13;

/// Upper bound for VAT in cents (999 999 999.99).
pub const MAX_VAT_CENTS: i64 = 99_999_999_999;
