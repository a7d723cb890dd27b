//! # Till Error Types
//!
//! Error types for the register, ledger, refund and report services.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Till Error Categories                           │
//! │                                                                         │
//! │  Register Preconditions (raised before any write)                      │
//! │  ├── RegisterAlreadyOpen   - open() while a register is open           │
//! │  └── NoOpenRegister        - posting/refund/close with none open       │
//! │                                                                         │
//! │  Lookups                                                               │
//! │  └── ReceiptNotFound       - refund of an unknown receipt code         │
//! │                                                                         │
//! │  Wrapped                                                               │
//! │  ├── Core                  - refund rules and input validation         │
//! │  └── Store                 - any persistence failure (rolled back)     │
//! │                                                                         │
//! │  Configuration                                                         │
//! │  ├── ConfigLoadFailed / ConfigSaveFailed                               │
//! │  └── InvalidConfig                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use till_core::{CoreError, ValidationError};
use till_db::DbError;

/// Column backing the single-open-register unique index.
const OPEN_REGISTER_INDEX: &str = "cash_registers.status";

/// Till service errors.
#[derive(Debug, Error)]
pub enum TillError {
    /// A register is already open.
    ///
    /// ## When This Occurs
    /// - `open()` while the previous register was never closed
    /// - Two terminals racing to open; the loser gets this error
    #[error("A cash register is already open")]
    RegisterAlreadyOpen,

    /// No register is open.
    ///
    /// ## When This Occurs
    /// - Recording a posting before the till was opened
    /// - Refunding with the till closed
    /// - Closing twice
    #[error("No cash register is open")]
    NoOpenRegister,

    /// Refund requested for a receipt code that does not exist.
    #[error("Receipt not found: {code}")]
    ReceiptNotFound { code: String },

    /// Business rule or validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Persistence failure. Any multi-step write was rolled back.
    #[error("Store failure: {0}")]
    Store(DbError),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Config loaded but failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TillError {
    /// Returns true for precondition errors that are safe to retry once the
    /// register state changes.
    pub fn is_precondition(&self) -> bool {
        matches!(self, TillError::RegisterAlreadyOpen | TillError::NoOpenRegister)
    }
}

/// Store errors, with the open-register index violation surfaced as
/// `RegisterAlreadyOpen`.
impl From<DbError> for TillError {
    fn from(err: DbError) -> Self {
        if err.is_unique_violation_on(OPEN_REGISTER_INDEX) {
            TillError::RegisterAlreadyOpen
        } else {
            TillError::Store(err)
        }
    }
}

impl From<ValidationError> for TillError {
    fn from(err: ValidationError) -> Self {
        TillError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for TillError {
    fn from(err: std::io::Error) -> Self {
        TillError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for TillError {
    fn from(err: toml::de::Error) -> Self {
        TillError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for TillError {
    fn from(err: toml::ser::Error) -> Self {
        TillError::ConfigSaveFailed(err.to_string())
    }
}

/// Result type for till services.
pub type TillResult<T> = Result<T, TillError>;
