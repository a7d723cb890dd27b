//! # till-core: Pure Business Logic for the Cash Register
//!
//! This crate holds the domain model of the till: registers, ledger
//! postings, sale receipts, refund math and period reports. Everything here
//! is a pure function over plain data. No I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 till-cli / register UI (callers)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        till-ledger (services, transaction boundaries)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  refund   │  │  report   │  │   │
//! │  │   │ Register  │  │   Money   │  │  Basket   │  │ PeriodRpt │  │   │
//! │  │   │ Receipt   │  │  TaxRate  │  │   Plan    │  │  Totals   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-db (Database Layer)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CashRegister, LedgerRecord, SaleReceipt, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`refund`] - Refund basket validation and refund totals
//! - [`report`] - Period report partitioning, ordering and totals
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::money::Money;
//! use till_core::TaxRate;
//!
//! // $10.00 at 10% tax, two units, rounded half-up once
//! let total = Money::refund_value(Money::from_cents(1000), TaxRate::from_bps(1000), 2);
//! assert_eq!(total.cents(), 2200);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod refund;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use refund::{plan_refund, RefundLine, RefundPlan, RefundedItem, Restock};
pub use report::{PeriodReport, ReportCategory, ReportRow, ReportTotals, ReportWindow};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single item on a receipt or refund line.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of a ledger posting description.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// Maximum length of a receipt code.
pub const MAX_RECEIPT_CODE_LENGTH: usize = 50;
