//! # Error Types
//!
//! Domain-specific error types for landed-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  landed-core errors (this file)                                        │
//! │  ├── CoreError        - Calculation failures (not found, store down)   │
//! │  ├── LookupError      - What a RateTable reports when it can't answer  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  landed-db errors (separate crate)                                     │
//! │  └── DbError          - SQLite failures, mapped to LookupError         │
//! │                                                                         │
//! │  NOT an error: an unrecognized rate string. It parses to 0.0 and the   │
//! │  result carries a CalculationWarning instead.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::HtsCode;

// =============================================================================
// Core Error
// =============================================================================

/// Failures of a landed-cost calculation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The HTS code has no record in the rate table.
    ///
    /// ## When This Occurs
    /// - Code is well-formed but not in the loaded schedule
    /// - Code exists at a different statistical suffix (matching is exact)
    ///
    /// `suggestions` holds nearby codes (same heading, then same chapter)
    /// that callers can offer instead.
    #[error("No data found for HTS code {code}")]
    HtsCodeNotFound {
        code: HtsCode,
        suggestions: Vec<HtsCode>,
    },

    /// The rate table's backing store could not be reached.
    ///
    /// Surfaced as-is; retry policy belongs to the caller.
    #[error("Rate table unavailable: {0}")]
    StoreUnavailable(#[from] LookupError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true when the failure is a missing HTS code.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::HtsCodeNotFound { .. })
    }
}

// =============================================================================
// Lookup Error
// =============================================================================

/// Raised by a [`crate::calculator::RateTable`] that cannot serve a lookup.
///
/// "No such code" is NOT a lookup error; tables return `Ok(None)` for that.
#[derive(Debug, Error)]
#[error("{store}: {reason}")]
pub struct LookupError {
    /// Which store failed (e.g. "sqlite", "in-memory schedule").
    pub store: String,
    /// Underlying cause, rendered.
    pub reason: String,
}

impl LookupError {
    pub fn new(store: impl Into<String>, reason: impl Into<String>) -> Self {
        LookupError {
            store: store.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the helpers in [`crate::validation`]; the calculator itself
/// does not sanitize shipment values.
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

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g. malformed HTS code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
