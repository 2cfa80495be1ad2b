//! Ledger error types for validation, lookup and concurrency failures.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Movement amount cannot be zero.
    #[error("Movement amount cannot be zero")]
    ZeroAmount,

    /// Movement amount cannot be negative.
    #[error("Movement amount cannot be negative")]
    NegativeAmount,

    /// Movement concept cannot be blank.
    #[error("Movement concept cannot be blank")]
    EmptyConcept,

    // ========== Referential Errors ==========
    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Ledger entry not found.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(Uuid),

    /// The entry named as reversed belongs to a different customer.
    #[error("Entry {entry_id} does not belong to customer {customer_id}")]
    ReversalCustomerMismatch {
        /// The entry named by `reverses_entry_id`.
        entry_id: Uuid,
        /// The customer being posted to.
        customer_id: Uuid,
    },

    // ========== Concurrency Errors ==========
    /// Concurrent posting detected on the same account.
    #[error("Concurrent posting detected, please retry")]
    ConcurrentPosting,

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::EmptyConcept => "EMPTY_CONCEPT",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::ReversalCustomerMismatch { .. } => "REVERSAL_CUSTOMER_MISMATCH",
            Self::ConcurrentPosting => "CONCURRENT_POSTING",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 422 Unprocessable Entity - domain rule violations
            Self::ZeroAmount
            | Self::NegativeAmount
            | Self::EmptyConcept
            | Self::ReversalCustomerMismatch { .. } => 422,

            // 404 Not Found
            Self::CustomerNotFound(_) | Self::EntryNotFound(_) => 404,

            // 409 Conflict - concurrency errors
            Self::ConcurrentPosting => 409,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentPosting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::ZeroAmount.error_code(), "ZERO_AMOUNT");
        assert_eq!(LedgerError::NegativeAmount.error_code(), "NEGATIVE_AMOUNT");
        assert_eq!(
            LedgerError::CustomerNotFound(Uuid::nil()).error_code(),
            "CUSTOMER_NOT_FOUND"
        );
        assert_eq!(
            LedgerError::ConcurrentPosting.error_code(),
            "CONCURRENT_POSTING"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::ZeroAmount.http_status_code(), 422);
        assert_eq!(
            LedgerError::CustomerNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(LedgerError::ConcurrentPosting.http_status_code(), 409);
        assert_eq!(
            LedgerError::Database("test".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::ConcurrentPosting.is_retryable());
        assert!(!LedgerError::ZeroAmount.is_retryable());
        assert!(!LedgerError::CustomerNotFound(Uuid::nil()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::ReversalCustomerMismatch {
            entry_id: Uuid::nil(),
            customer_id: Uuid::nil(),
        };
        assert_eq!(
            err.to_string(),
            format!(
                "Entry {} does not belong to customer {}",
                Uuid::nil(),
                Uuid::nil()
            )
        );
    }
}
