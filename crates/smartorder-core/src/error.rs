//! # Error Types
//!
//! Domain-specific error types for smartorder-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  smartorder-core errors (this file)                                 │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  smartorder-engine errors (separate crate)                          │
//! │  └── EngineError      - Lookup / lifecycle failures                 │
//! │                                                                     │
//! │  Flow: ValidationError → EngineError → Request layer                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core crate is pure: the only thing that can fail here is input
//! validation. Lookup failures (unknown order id, wrong tenant scope)
//! belong to the engine, which owns the state.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any mutation happens; a rejected request leaves every
/// component untouched. Unknown dish ids on cart update/remove are NOT
/// errors (silent no-ops), so there is deliberately no variant for them.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required identifier is missing or blank.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Value must be at least one.
    #[error("{field} must be positive, got {value}")]
    MustBePositive { field: &'static str, value: i64 },

    /// Amount is not usable for a wallet movement.
    #[error("{field} has invalid amount: {reason}")]
    InvalidAmount { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Required { field: "storeId" };
        assert_eq!(err.to_string(), "storeId is required");

        let err = ValidationError::MustBePositive {
            field: "qty",
            value: 0,
        };
        assert_eq!(err.to_string(), "qty must be positive, got 0");
    }
}
