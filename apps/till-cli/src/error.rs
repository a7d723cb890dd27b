//! # CLI Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  till refund R-001 item:2                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Command Function ── Result<T, CliError>                               │
//! │         │                                                               │
//! │         ├── TillError::NoOpenRegister ─────────┐                       │
//! │         ├── CoreError::RefundQuantityExceeded ─┼──► CliError            │
//! │         ├── DbError::QueryFailed ──────────────┘        │               │
//! │         │                                               ▼               │
//! │         ▼                          stdout: {"code": "...", "message"}  │
//! │  Success ──► stdout: JSON result   exit code: CliError::exit_code()    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use till_core::CoreError;
use till_db::DbError;
use till_ledger::TillError;

/// Error printed when a command fails.
///
/// ```json
/// {
///   "code": "NO_OPEN_REGISTER",
///   "message": "No cash register is open"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Receipt or register not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// `open` while a register is open
    RegisterAlreadyOpen,

    /// Posting, refund or close with the till closed
    NoOpenRegister,

    /// Refund rule violated
    BusinessLogic,

    /// Store operation failed
    DatabaseError,

    /// Config file unreadable or invalid
    ConfigError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Process exit code for this error category.
    pub const fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::Internal | ErrorCode::DatabaseError => 1,
            ErrorCode::ValidationError => 3,
            ErrorCode::RegisterAlreadyOpen | ErrorCode::NoOpenRegister => 4,
            ErrorCode::NotFound => 5,
            ErrorCode::BusinessLogic => 6,
            ErrorCode::ConfigError => 7,
        }
    }
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        CliError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Internal, message)
    }

    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }
}

/// Converts database errors to CLI errors.
impl From<DbError> for CliError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CliError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => CliError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                CliError::new(ErrorCode::ValidationError, "Invalid reference (unknown warehouse or product)")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => CliError::new(ErrorCode::DatabaseError, "Database pool exhausted"),
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to CLI errors.
impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => CliError::validation(e.to_string()),
            CoreError::ItemNotOnReceipt { code, item_id } => {
                CliError::not_found(&format!("Item on receipt {}", code), &item_id)
            }
            CoreError::MissingProductReference { .. } => CliError::internal(err.to_string()),
            CoreError::InvalidReceiptStatus { .. }
            | CoreError::RefundQuantityExceeded { .. }
            | CoreError::EmptyRefundBasket => CliError::new(ErrorCode::BusinessLogic, err.to_string()),
        }
    }
}

/// Converts service errors to CLI errors.
impl From<TillError> for CliError {
    fn from(err: TillError) -> Self {
        match err {
            TillError::RegisterAlreadyOpen => CliError::new(ErrorCode::RegisterAlreadyOpen, err.to_string()),
            TillError::NoOpenRegister => CliError::new(ErrorCode::NoOpenRegister, err.to_string()),
            TillError::ReceiptNotFound { code } => CliError::not_found("Receipt", &code),
            TillError::Core(e) => e.into(),
            TillError::Store(e) => e.into(),
            TillError::ConfigLoadFailed(_) | TillError::ConfigSaveFailed(_) | TillError::InvalidConfig(_) => {
                CliError::new(ErrorCode::ConfigError, err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(format!("Failed to encode output: {}", err))
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::internal(format!("Failed to write output: {}", err))
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for CliError {}
