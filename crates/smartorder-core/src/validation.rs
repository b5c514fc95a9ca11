//! # Validation Module
//!
//! Input validation helpers shared by the engine's mutating operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Request layer (out of scope)                              │
//! │  ├── Authentication, role checks, request parsing                   │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE + key constructors                            │
//! │  ├── Required identifiers present and non-blank                     │
//! │  ├── Quantities and amounts in range                                │
//! │  └── Rejected BEFORE any component state is mutated                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a quantity for `add_item`: must be at least one.
///
/// `update_qty` deliberately bypasses this check, since a non-positive
/// quantity there means "remove the line".
pub fn validate_add_qty(qty: i64) -> ValidationResult<()> {
    if qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: "qty",
            value: qty,
        });
    }
    Ok(())
}

/// Validates a top-up or charge amount: must be strictly positive.
/// The sign of the resulting ledger entry is decided by the operation,
/// not the caller.
pub fn validate_amount(field: &'static str, amount: Money) -> ValidationResult<()> {
    if amount.cents() <= 0 {
        return Err(ValidationError::InvalidAmount {
            field,
            reason: format!("must be positive, got {amount}"),
        });
    }
    Ok(())
}

/// Validates a renewal window in days.
pub fn validate_days(days: i64) -> ValidationResult<()> {
    if days < 1 {
        return Err(ValidationError::MustBePositive {
            field: "days",
            value: days,
        });
    }
    Ok(())
}
