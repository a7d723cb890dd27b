//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── CoreError        - Refund and receipt rule violations             │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  till-db errors (separate crate)                                       │
//! │  └── DbError          - Store operation failures                       │
//! │                                                                         │
//! │  till-ledger errors                                                    │
//! │  └── TillError        - Register preconditions + wrapped errors        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → TillError → CliError → stdout     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Raised before any mutation happens, so they are always safe to retry
/// once the caller has fixed the input.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Receipt is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Refunding a receipt that was never paid
    /// - Refunding a receipt that is already refunded
    #[error("Receipt {code} is {current_status}, cannot perform operation")]
    InvalidReceiptStatus {
        code: String,
        current_status: String,
    },

    /// A refund line references an item that is not on the receipt.
    #[error("Item {item_id} is not on receipt {code}")]
    ItemNotOnReceipt { code: String, item_id: String },

    /// Refund quantity is larger than what is left to refund on the item.
    ///
    /// ## User Workflow
    /// ```text
    /// Receipt line: 3 × Cola (0 refunded)
    ///      │
    ///      ▼
    /// Refund basket asks for 5
    ///      │
    ///      ▼
    /// RefundQuantityExceeded { refundable: 3, requested: 5 }
    /// ```
    #[error("Cannot refund {requested} of item {item_id}: only {refundable} refundable")]
    RefundQuantityExceeded {
        item_id: String,
        refundable: i64,
        requested: i64,
    },

    /// The refund basket has no lines.
    #[error("Refund basket is empty")]
    EmptyRefundBasket,

    /// Receipt item was loaded without its product reference, so the tax
    /// rate needed for the refund is unknown.
    #[error("Product reference not loaded for receipt item {item_id}")]
    MissingProductReference { item_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
#[derive(Debug, Error)]
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

    /// Invalid format (e.g., invalid amount, reversed period).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::RefundQuantityExceeded {
            item_id: "item-1".to_string(),
            refundable: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Cannot refund 5 of item item-1: only 3 refundable"
        );

        let err = CoreError::InvalidReceiptStatus {
            code: "R-001".to_string(),
            current_status: "refunded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Receipt R-001 is refunded, cannot perform operation"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "description".to_string(),
        };
        assert_eq!(err.to_string(), "description is required");

        let err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        assert_eq!(err.to_string(), "amount must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
