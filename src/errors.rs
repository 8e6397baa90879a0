//! Unified error types and result handling.
//!
//! Every failure in the crate maps to one `Error` variant so callers can match
//! on the category: validation (caller's fault, no state change), not-found,
//! conflict (uniqueness violation, retryable), data access, or configuration.
//! Partial failures of multi-step operations are NOT errors - they are modeled
//! as first-class outcome enums in [`crate::core::payment`] and
//! [`crate::core::loan`] so the already-committed state is never hidden.

use chrono::NaiveDate;
use thiserror::Error;

/// Unified error type for all loan, ledger and capital operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Amount is zero, negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Payment would overshoot the loan's remaining balance
    #[error("Payment of {amount} exceeds remaining amount {remaining}")]
    AmountExceedsRemaining {
        /// The rejected payment amount
        amount: f64,
        /// Remaining amount on the loan before this payment
        remaining: f64,
    },

    /// Interest rate outside the 0-100 range
    #[error("Interest rate {rate} must be between 0 and 100")]
    InvalidInterestRate {
        /// The rejected rate
        rate: f64,
    },

    /// Loan start date is not strictly before its end date
    #[error("Invalid date range: start {start} must be before end {end}")]
    InvalidDateRange {
        /// Start of the rejected range
        start: NaiveDate,
        /// End of the rejected range
        end: NaiveDate,
    },

    /// National identity number does not match the accepted formats
    #[error("Invalid NIC number: {nic} (expected 9 digits + V/X or 12 digits)")]
    InvalidNic {
        /// The rejected NIC string
        nic: String,
    },

    /// Input shape error not covered by a more specific variant
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description of what was rejected
        message: String,
    },

    /// No member matches the given reference
    #[error("No member found for {reference}")]
    MemberNotFound {
        /// NIC number or id used for the lookup
        reference: String,
    },

    /// No loan matches the given reference
    #[error("No loan found for {reference}")]
    LoanNotFound {
        /// Loan number, registration number or id used for the lookup
        reference: String,
    },

    /// The singleton capital account row has not been seeded yet
    #[error("Capital account has not been initialized")]
    CapitalNotInitialized,

    /// Uniqueness violation on insert - safe to regenerate identifiers and retry
    #[error("Conflict: {message}")]
    Conflict {
        /// Which uniqueness constraint was violated
        message: String,
    },

    /// Storage collaborator failure (transport, server-side)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration loading or parsing error
    #[error("Configuration error: {message}")]
    Config {
        /// What failed to load or parse
        message: String,
    },

    /// I/O error from the ambient layers
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Maps a unique-constraint violation onto [`Error::Conflict`], leaving
    /// every other database error untouched. Used at insert sites where a
    /// concurrent writer may have minted the same identifier.
    pub fn from_insert(err: sea_orm::DbErr, what: &str) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => Error::Conflict {
                message: format!("{what} already exists"),
            },
            _ => Error::Database(err),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
