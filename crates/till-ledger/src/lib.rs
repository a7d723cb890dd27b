//! # till-ledger: Cash Register Services
//!
//! Opens and closes the till, posts manual cash movements, refunds sale
//! receipts and builds period reports.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Every Mutating Operation                          │
//! │                                                                         │
//! │  caller (CLI, UI)                                                      │
//! │     │  operator id passed explicitly                                  │
//! │     ▼                                                                   │
//! │  validate input ──► reject before touching the store                   │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  WriteGate.lock()  (one writer per process)                            │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  db.begin()  BEGIN IMMEDIATE (one writer per database file)            │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  read open register ─► writes ... ─► commit                            │
//! │                          │                  │                           │
//! │                          └── any error ─────┴──► tx dropped = rollback │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads (`current_open`, `records_for_period`, reports) skip the gate.
//!
//! ## Usage
//! ```rust,ignore
//! use till_core::{LedgerType, Money, OperatorId};
//! use till_ledger::{Till, TillConfig};
//!
//! let till = Till::connect(&TillConfig::load(None)?).await?;
//! let op = OperatorId::new("cashier-1")?;
//!
//! till.registers().open(&op, Money::from_cents(10_000)).await?;
//! till.ledger().record(&op, Money::from_cents(5_000), LedgerType::Income, "Float top-up").await?;
//! ```

use std::sync::Arc;
use tokio::sync::Mutex;

use till_db::{Database, DbConfig};

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cash_register;
pub mod config;
pub mod error;
pub mod ledger;
pub mod refund;
pub mod report;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use cash_register::CashRegisterService;
pub use config::TillConfig;
pub use error::{TillError, TillResult};
pub use ledger::LedgerService;
pub use refund::{RefundOutcome, RefundProcessor};
pub use report::ReportAggregator;

/// Serializes every write to register state within the process.
///
/// Across processes, `BEGIN IMMEDIATE` queues writers on the database file
/// and the partial unique index on open registers backstops `open()`.
pub(crate) type WriteGate = Arc<Mutex<()>>;

// =============================================================================
// Till
// =============================================================================

/// Entry point handing out the till services.
///
/// All services created from one `Till` (and its clones) share the same
/// write gate.
#[derive(Debug, Clone)]
pub struct Till {
    db: Database,
    gate: WriteGate,
}

impl Till {
    /// Wraps an existing database.
    pub fn new(db: Database) -> Self {
        Till {
            db,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Connects to the database named by the configuration.
    pub async fn connect(config: &TillConfig) -> TillResult<Self> {
        Self::with_db_config(config.db_config()).await
    }

    /// Connects with an explicit store configuration.
    pub async fn with_db_config(config: DbConfig) -> TillResult<Self> {
        let db = Database::new(config).await?;
        Ok(Till::new(db))
    }

    /// Returns the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn registers(&self) -> CashRegisterService {
        CashRegisterService::new(self.db.clone(), self.gate.clone())
    }

    pub fn ledger(&self) -> LedgerService {
        LedgerService::new(self.db.clone(), self.gate.clone())
    }

    pub fn refunds(&self) -> RefundProcessor {
        RefundProcessor::new(self.db.clone(), self.gate.clone())
    }

    pub fn reports(&self) -> ReportAggregator {
        ReportAggregator::new(self.db.clone())
    }
}
