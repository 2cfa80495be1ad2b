//! Invoicing workflow errors.

use bdn_shared::types::SaleId;
use chrono::NaiveDate;
use thiserror::Error;

use crate::afip::{AfipError, FiscalValidationError};

use super::store::StoreError;

/// Errors from the invoicing workflow.
#[derive(Debug, Clone, Error)]
pub enum InvoicingError {
    /// No sale exists under the given id.
    #[error("sale {0} not found")]
    SaleNotFound(SaleId),

    /// The sale is not flagged as a declared ("white") sale.
    #[error("sale {0} is not flagged for electronic invoicing")]
    NotDeclared(SaleId),

    /// The sale has not been confirmed yet, or was cancelled.
    #[error("sale {0} is not confirmed")]
    NotConfirmed(SaleId),

    /// The sale already holds an authorization; submission is terminal.
    #[error("sale {sale_id} is already invoiced as {full_number} (CAE {cae})")]
    AlreadyInvoiced {
        /// The sale in question.
        sale_id: SaleId,
        /// Recorded document number.
        full_number: String,
        /// Recorded authorization code.
        cae: String,
    },

    /// A previous attempt left an authorization pending reconciliation;
    /// submitting again would request a second CAE.
    #[error("sale {0} has an authorization pending manual reconciliation")]
    PendingReview(SaleId),

    /// The sale failed pre-flight validation; nothing was submitted.
    #[error("sale failed fiscal validation with {} error(s)", .0.len())]
    Validation(Vec<FiscalValidationError>),

    /// The gateway or the authority failed; local state is unchanged and
    /// the operation is safe to retry later.
    #[error(transparent)]
    Afip(#[from] AfipError),

    /// The authority issued a CAE but it could not be recorded locally.
    ///
    /// External and local state have diverged; this must reach an
    /// operator instead of being retried, because a retry would request
    /// a second CAE for the same logical invoice.
    #[error(
        "voucher {full_number} was authorized (CAE {cae}) but could not be recorded: {detail}"
    )]
    AuthorizedButUnrecorded {
        /// The sale in question.
        sale_id: SaleId,
        /// Authorized voucher number.
        voucher_number: i64,
        /// Formatted document number.
        full_number: String,
        /// Authorization code the authority issued.
        cae: String,
        /// Expiry of the issued CAE.
        cae_expiry: NaiveDate,
        /// What went wrong while recording.
        detail: String,
    },

    /// Storage failure before any authority traffic.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl InvoicingError {
    /// Machine-readable error code for API responses and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SaleNotFound(_) => "SALE_NOT_FOUND",
            Self::NotDeclared(_) => "SALE_NOT_DECLARED",
            Self::NotConfirmed(_) => "SALE_NOT_CONFIRMED",
            Self::AlreadyInvoiced { .. } => "ALREADY_INVOICED",
            Self::PendingReview(_) => "AUTHORIZATION_PENDING_REVIEW",
            Self::Validation(_) => "FISCAL_VALIDATION_FAILED",
            Self::Afip(_) => "AFIP_ERROR",
            Self::AuthorizedButUnrecorded { .. } => "AUTHORIZED_NOT_RECORDED",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// HTTP status the API layer should answer with.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::SaleNotFound(_) => 404,
            Self::NotDeclared(_)
            | Self::NotConfirmed(_)
            | Self::AlreadyInvoiced { .. }
            | Self::PendingReview(_) => 409,
            Self::Validation(_) => 422,
            Self::Afip(_) => 502,
            Self::AuthorizedButUnrecorded { .. } | Self::Store(_) => 500,
        }
    }

    /// Whether repeating the same call later could succeed.
    ///
    /// `AuthorizedButUnrecorded` is deliberately non-retryable even
    /// though a retry might "work": it would double-issue.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Afip(err) => err.is_retryable(),
            Self::Store(_) => true,
            _ => false,
        }
    }
}
