//! # Error Types
//!
//! Domain-specific error types for cantina-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cantina-core errors (this file)                                       │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cantina-db errors (separate crate)                                    │
//! │  └── DbError          - Storage failures (wraps CoreError)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → UI                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error is recoverable by the user correcting input and retrying.
//! Nothing here is fatal to the process and nothing is retried automatically.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Cash tendered does not cover the final total.
    ///
    /// ## User Workflow
    /// ```text
    /// Final total: $255.20 MXN
    ///      │
    ///      ▼
    /// Tendered: $10.00 USD × 19.00 = $190.00 MXN
    ///      │
    ///      ▼
    /// InsufficientFunds { required: $255.20, received: $190.00 }
    ///      │
    ///      ▼
    /// Order untouched, cashier corrects the amount and resubmits
    /// ```
    #[error("Insufficient funds: required {required}, received {received}")]
    InsufficientFunds { required: Money, received: Money },

    /// Line item id is not on the order.
    #[error("Order item not found: {0}")]
    ItemNotFound(String),

    /// Split bill id is not on the order.
    #[error("Split bill not found: {0}")]
    SplitBillNotFound(String),

    /// Order is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Adding items to a completed order
    /// - Saving an order that was already saved
    /// - Paying a cancelled delivery
    #[error("Order {order_id} is {current_status}, cannot {operation}")]
    InvalidOrderStatus {
        order_id: String,
        current_status: String,
        operation: String,
    },

    /// Delivery status change that the workflow does not allow.
    #[error("Cannot move order {order_id} from {from} to {to}")]
    InvalidStatusTransition {
        order_id: String,
        from: String,
        to: String,
    },

    /// Cash drawer operation that needs an open session.
    #[error("No cash register session is open")]
    NoOpenSession,

    /// Opening the drawer twice without closing it.
    #[error("Cash register session already open since {opened_at}")]
    SessionAlreadyOpen { opened_at: String },

    /// A payment attempt that already settled cannot be submitted again.
    #[error("Payment for order {0} is already settled")]
    PaymentAlreadySettled(String),

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
/// Used for early validation before business logic runs.
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

    /// Invalid format (e.g., not a number, too many decimals).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
