//! # Error Types
//!
//! Domain-specific error types for lumen-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lumen-core errors (this file)                                         │
//! │  ├── CoreError        - Settlement rule violations                     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  lumen-db errors (separate crate)                                      │
//! │  └── DbError          - Remote store operation failures                │
//! │                                                                         │
//! │  lumen-sync errors (separate crate)                                    │
//! │  └── SyncError        - Queue persistence and drain failures           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → SyncError → Operator    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (IDs, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent settlement rule violations. They should be caught
/// and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Credit sale cannot be found.
    ///
    /// ## When This Occurs
    /// - Recording a payment against an ID that doesn't exist
    /// - A merge payment selecting bill IDs outside the customer's set
    #[error("Credit sale not found: {0}")]
    CreditSaleNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before settlement logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    ///
    /// ## When This Occurs
    /// - Credit payment with amount ≤ 0
    /// - Merge payment with an empty pool
    /// - Line item with non-positive quantity
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
