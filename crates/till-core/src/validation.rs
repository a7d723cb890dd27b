//! # Validation Module
//!
//! Input validation for register and ledger operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (CLI / UI)                                            │
//! │  └── Parsing (amounts, dates, item:qty pairs)                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (pure business rules)                            │
//! │  └── Checked before any store transaction is opened                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (amount_cents > 0)                                          │
//! │  ├── UNIQUE single open register                                       │
//! │  └── Append-only / terminal-status triggers                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::Money;
//! use till_core::validation::{validate_description, validate_posting_amount};
//!
//! validate_posting_amount(Money::from_cents(5000)).unwrap();
//! assert!(validate_description("   ").is_err());
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_DESCRIPTION_LENGTH, MAX_ITEM_QUANTITY, MAX_RECEIPT_CODE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Monetary Validators
// =============================================================================

/// Validates the balance an operator confirms when opening the till.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (empty drawer)
pub fn validate_opening_balance(balance: Money) -> ValidationResult<()> {
    if balance.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "opening balance".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates the magnitude of a ledger posting.
///
/// ## Rules
/// - Must be positive (> 0); the sign comes from the posting type
pub fn validate_posting_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a posting description.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most MAX_DESCRIPTION_LENGTH (255) characters
///
/// ## Returns
/// The trimmed description.
pub fn validate_description(description: &str) -> ValidationResult<String> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LENGTH,
        });
    }

    Ok(description.to_string())
}

/// Validates a receipt code.
///
/// ## Rules
/// - Must not be empty
/// - At most MAX_RECEIPT_CODE_LENGTH (50) characters
/// - Only letters, numbers, hyphens and underscores
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_receipt_code;
///
/// assert!(validate_receipt_code("R-001").is_ok());
/// assert!(validate_receipt_code("").is_err());
/// assert!(validate_receipt_code("R 001").is_err());
/// ```
pub fn validate_receipt_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "receipt code".to_string(),
        });
    }

    if code.len() > MAX_RECEIPT_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "receipt code".to_string(),
            max: MAX_RECEIPT_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "receipt code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a refund line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// The bound against the sold quantity is checked by the refund planner,
/// which knows the receipt.
pub fn validate_refund_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "refund quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "refund quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Period Validators
// =============================================================================

/// Validates an inclusive report period.
pub fn validate_period(from: DateTime<Utc>, to: DateTime<Utc>) -> ValidationResult<()> {
    if from > to {
        return Err(ValidationError::InvalidFormat {
            field: "period".to_string(),
            reason: format!("start {} is after end {}", from.to_rfc3339(), to.to_rfc3339()),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_opening_balance() {
        assert!(validate_opening_balance(Money::zero()).is_ok());
        assert!(validate_opening_balance(Money::from_cents(10000)).is_ok());
        assert!(validate_opening_balance(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_posting_amount() {
        assert!(validate_posting_amount(Money::from_cents(1)).is_ok());
        assert!(validate_posting_amount(Money::zero()).is_err());
        assert!(validate_posting_amount(Money::from_cents(-500)).is_err());
    }

    #[test]
    fn test_validate_description() {
        assert_eq!(validate_description("  Float top-up ").unwrap(), "Float top-up");
        assert!(validate_description("").is_err());
        assert!(validate_description("   ").is_err());
        assert!(validate_description(&"A".repeat(256)).is_err());
        assert!(validate_description(&"A".repeat(255)).is_ok());
    }

    #[test]
    fn test_validate_receipt_code() {
        assert!(validate_receipt_code("R-001").is_ok());
        assert!(validate_receipt_code("20261019_01_0042").is_ok());

        assert!(validate_receipt_code("").is_err());
        assert!(validate_receipt_code("has space").is_err());
        assert!(validate_receipt_code(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_refund_quantity() {
        assert!(validate_refund_quantity(1).is_ok());
        assert!(validate_refund_quantity(999).is_ok());

        assert!(validate_refund_quantity(0).is_err());
        assert!(validate_refund_quantity(-2).is_err());
        assert!(validate_refund_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_period() {
        let now = Utc::now();
        assert!(validate_period(now, now).is_ok());
        assert!(validate_period(now - Duration::hours(1), now).is_ok());
        assert!(validate_period(now, now - Duration::seconds(1)).is_err());
    }
}
