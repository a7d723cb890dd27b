//! # till-db: Database Layer for the Till
//!
//! SQLite persistence for registers, ledger postings, sale receipts and
//! warehouse stock, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Data Flow                                 │
//! │                                                                         │
//! │  till-ledger service (RefundProcessor::refund)                         │
//! │       │   db.begin() → one transaction                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     till-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ register      │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ ledger        │    │              │  │   │
//! │  │   │ Transactions  │    │ receipt       │    │              │  │   │
//! │  │   │               │    │ product/stock │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (till.db)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Kinds of Repository Calls
//!
//! - Pool reads (`db.ledger().for_period(..)`) run on any free connection.
//! - Transactional writes are free functions taking `&mut SqliteConnection`
//!   (`repository::ledger::insert(&mut tx, ..)`) so the caller decides
//!   which statements share a transaction.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("till.db")).await?;
//!
//! let mut tx = db.begin().await?;
//! let open = till_db::repository::register::fetch_open(&mut tx).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{commit, Database, DbConfig};

// Repository re-exports for convenience
pub use repository::ledger::LedgerRepository;
pub use repository::product::ProductRepository;
pub use repository::receipt::ReceiptRepository;
pub use repository::register::RegisterRepository;
pub use repository::stock::StockRepository;

/// Transaction handle used by the transactional repository functions.
pub type Transaction<'c> = sqlx::Transaction<'c, sqlx::Sqlite>;
