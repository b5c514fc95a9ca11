//! Error types for the lifecycle engine.

use smartorder_core::ValidationError;
use thiserror::Error;

/// Engine errors.
///
/// The surface is deliberately small: most cart/table operations are
/// defined to be no-ops rather than failures, so only order lookups and
/// input validation can fail.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Order id does not exist in the ledger.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Order exists but belongs to a different store than the caller's
    /// scope. Every order mutation verifies tenant scope.
    #[error("Order {order_id} does not belong to store {store_id}")]
    OrderScopeMismatch { order_id: String, store_id: String },

    /// Input rejected before any mutation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
