//! # Checkout Engine
//!
//! Turns a validated [`CheckoutRequest`] into a persisted [`Receipt`], or
//! into exactly one classified [`CheckoutError`] with nothing persisted.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         CheckoutService::execute                        │
//! │                                                                         │
//! │  ┌ timeout_at(deadline) ────────────────────────────────────────────┐   │
//! │  │  CheckoutTx::begin(pool)        BEGIN           Received         │   │
//! │  │  aggregate(request.items())     tally-core      Aggregating      │   │
//! │  │  validator::validate_stock      lock + check    Validating       │   │
//! │  │  writer::write_receipt          receipt, lines  Writing          │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! │     │ ok                          │ error               │ deadline      │
//! │     ▼                             ▼                     ▼               │
//! │  tx.commit()                  tx.rollback(err)      tx.abandon(err)     │
//! │  Committed                    RolledBack            RolledBack          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! COMMIT runs outside the deadline. Once it is sent its outcome is the
//! checkout's outcome, so `Timeout` always means nothing was committed.
//!
//! Every storage failure is classified at the statement that raised it, by
//! [`classifier::classify`], so the service only ever handles
//! `CheckoutError`.
//!
//! ## Concurrency
//!
//! SQLite has one writer at a time. The validator's first statement takes
//! the database write lock, so checkouts run one after another even when
//! their carts share no product. Disjoint carts still both succeed; they
//! wait for each other in the busy handler instead of running side by
//! side.

pub mod classifier;
pub mod validator;
pub mod writer;

use std::time::Duration;

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

use tally_core::{aggregate, CheckoutError, CheckoutPhase, CheckoutRequest, CheckoutResult, Receipt};

use classifier::{classify, FailureSite};

// =============================================================================
// Transaction Context
// =============================================================================

/// The open transaction of one checkout attempt, and where it stands.
///
/// Handed to the validator and the writer so both run on the same
/// connection. Dropping it without `commit` rolls the transaction back.
pub struct CheckoutTx {
    tx: Transaction<'static, Sqlite>,
    phase: CheckoutPhase,
    receipt_number: String,
}

impl CheckoutTx {
    /// Opens a transaction for the given receipt, in the Received phase.
    pub async fn begin(pool: &SqlitePool, receipt_number: impl Into<String>) -> CheckoutResult<Self> {
        let tx = pool
            .begin()
            .await
            .map_err(|e| classify(e.into(), FailureSite::Begin))?;

        let receipt_number = receipt_number.into();
        debug!(receipt_number = %receipt_number, phase = %CheckoutPhase::Received, "Transaction open");

        Ok(CheckoutTx {
            tx,
            phase: CheckoutPhase::Received,
            receipt_number,
        })
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    pub fn receipt_number(&self) -> &str {
        &self.receipt_number
    }

    /// The transaction's connection, for statements that must see its locks.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Moves to the next phase. An illegal transition is an Internal error.
    pub fn advance(&mut self, next: CheckoutPhase) -> CheckoutResult<()> {
        if self.phase.is_terminal() {
            return Err(CheckoutError::internal(format!(
                "checkout {} already {}",
                self.receipt_number, self.phase
            )));
        }
        if !self.phase.can_advance_to(next) {
            return Err(CheckoutError::internal(format!(
                "illegal checkout phase transition {} -> {}",
                self.phase, next
            )));
        }

        debug!(receipt_number = %self.receipt_number, phase = %next, "Checkout phase");
        self.phase = next;
        Ok(())
    }

    /// Commits. Only legal from the Writing phase.
    pub async fn commit(mut self) -> CheckoutResult<()> {
        self.advance(CheckoutPhase::Committed)?;
        self.tx
            .commit()
            .await
            .map_err(|e| classify(e.into(), FailureSite::Commit))
    }

    /// Rolls back after `cause` and waits for SQLite to confirm.
    ///
    /// Returns the phase the attempt ended in. A failed rollback is logged
    /// and otherwise ignored: the connection is discarded and SQLite
    /// discards the uncommitted changes with it.
    pub async fn rollback(mut self, cause: &CheckoutError) -> CheckoutPhase {
        self.mark_rolled_back(cause);

        if let Err(e) = self.tx.rollback().await {
            error!(receipt_number = %self.receipt_number, error = %e, "Rollback failed");
        }
        self.phase
    }

    /// Rolls back without waiting.
    ///
    /// For a transaction whose last statement was cut off by the deadline
    /// and may still be running on the connection. Dropping the sqlx
    /// transaction queues the ROLLBACK behind that statement.
    pub fn abandon(mut self, cause: &CheckoutError) -> CheckoutPhase {
        self.mark_rolled_back(cause);
        self.phase
    }

    fn mark_rolled_back(&mut self, cause: &CheckoutError) {
        let failed_in = self.phase;
        if let Err(e) = self.advance(CheckoutPhase::RolledBack) {
            error!(receipt_number = %self.receipt_number, error = %e, "Rollback from a finished checkout");
        }

        warn!(
            receipt_number = %self.receipt_number,
            failed_in = %failed_in,
            phase = %self.phase,
            kind = ?cause.kind(),
            error = %cause,
            "Checkout rolled back"
        );
    }
}

// =============================================================================
// Checkout Service
// =============================================================================

/// Runs checkouts against a pool, each under the same deadline.
///
/// ## Usage
/// ```rust,ignore
/// let service = db.checkout(Duration::from_secs(5));
/// match service.execute(&request).await {
///     Ok(receipt) => println!("{} {}", receipt.receipt_number, receipt.total()),
///     Err(err) => eprintln!("{:?}: {err}", err.kind()),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
    timeout: Duration,
}

impl CheckoutService {
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        CheckoutService { pool, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Executes one checkout atomically.
    ///
    /// ## Returns
    /// * `Ok(Receipt)` - receipt, line items and stock decrements committed
    /// * `Err(CheckoutError)` - nothing persisted
    pub async fn execute(&self, request: &CheckoutRequest) -> CheckoutResult<Receipt> {
        let receipt_number = request.receipt_number();
        debug!(
            receipt_number = %receipt_number,
            lines = request.items().len(),
            "Checkout received"
        );

        let deadline = Instant::now() + self.timeout;

        let opened = timeout_at(deadline, CheckoutTx::begin(&self.pool, receipt_number)).await;
        let mut tx = match opened {
            Ok(tx) => tx?,
            Err(_) => {
                warn!(
                    receipt_number = %receipt_number,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Checkout deadline exceeded before the transaction opened"
                );
                return Err(CheckoutError::Timeout(self.timeout));
            }
        };

        let written = timeout_at(deadline, Self::validate_and_write(&mut tx, request)).await;
        let written = match written {
            Ok(written) => written,
            Err(_) => {
                let err = CheckoutError::Timeout(self.timeout);
                tx.abandon(&err);
                return Err(err);
            }
        };

        match written {
            Ok(receipt) => {
                tx.commit().await?;
                info!(
                    receipt_number = %receipt.receipt_number,
                    total_cents = receipt.total_cents,
                    vat_cents = receipt.vat_cents,
                    "Checkout committed"
                );
                Ok(receipt)
            }
            Err(err) => {
                if matches!(err, CheckoutError::Internal { .. }) {
                    error!(receipt_number = %receipt_number, error = %err, "Checkout failed");
                }
                tx.rollback(&err).await;
                Err(err)
            }
        }
    }

    async fn validate_and_write(tx: &mut CheckoutTx, request: &CheckoutRequest) -> CheckoutResult<Receipt> {
        tx.advance(CheckoutPhase::Aggregating)?;
        let cart = aggregate(request.items());

        tx.advance(CheckoutPhase::Validating)?;
        let priced = validator::validate_stock(tx, &cart).await?;

        tx.advance(CheckoutPhase::Writing)?;
        writer::write_receipt(tx, request, &priced).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
