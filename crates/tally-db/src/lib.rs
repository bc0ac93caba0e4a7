//! # tally-db: Database Layer and Checkout Engine for Tally POS
//!
//! SQLite storage through sqlx, and the one operation that needs real
//! transactional care: checkout.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (collaborator)                                           │
//! │       │  CheckoutPayload ──► CheckoutRequest (tally-core validation)   │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │   Checkout    │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (checkout/)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CheckoutTx    │    │ 001_initial  │  │   │
//! │  │   │ Repositories  │    │ validator     │    │              │  │   │
//! │  │   │               │    │ writer        │    │              │  │   │
//! │  │   │               │    │ classifier    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Environment configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Stock, receipt and directory repositories
//! - [`checkout`] - The checkout transaction
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_core::CheckoutRequest;
//! use tally_db::{Database, TallyConfig};
//!
//! let config = TallyConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let request = CheckoutRequest::try_from(payload)?;
//! let receipt = db.checkout(config.checkout_timeout()).execute(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod fixtures;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutService, CheckoutTx};
pub use config::{ConfigError, TallyConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::directory::DirectoryRepository;
pub use repository::receipt::ReceiptRepository;
pub use repository::stock::StockRepository;

// =============================================================================
// Logging
// =============================================================================

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tally=debug,sqlx=warn";

/// Installs the fmt subscriber used by the binaries.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
