//! Persistence seam for the invoicing workflow.
//!
//! The orchestrator never touches the database directly; it goes through
//! this trait so the workflow can be tested against an in-memory store.

use bdn_shared::types::SaleId;
use thiserror::Error;

use crate::sales::{Customer, Sale};

use super::types::RecordedAuthorization;

/// Failure in the persistence layer backing the workflow.
#[derive(Debug, Clone, Error)]
#[error("sale store error: {0}")]
pub struct StoreError(pub String);

/// Persistence operations the invoicing workflow needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SaleStore: Send + Sync {
    /// Loads a sale with its customer and line items eagerly attached.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure; an absent sale is `Ok(None)`.
    async fn load_for_invoicing(
        &self,
        sale_id: SaleId,
    ) -> Result<Option<(Sale, Customer)>, StoreError>;

    /// Writes a granted authorization onto a still-uninvoiced sale.
    ///
    /// The write must be conditional on the sale being uninvoiced at
    /// update time. Returns `false` when the condition did not hold and
    /// nothing was written.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    async fn record_authorization(
        &self,
        sale_id: SaleId,
        authorization: &RecordedAuthorization,
    ) -> Result<bool, StoreError>;

    /// Flags a sale whose authorization could not be recorded normally,
    /// attaching the authorization details and a reconciliation note.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    async fn mark_authorized_unrecorded(
        &self,
        sale_id: SaleId,
        authorization: &RecordedAuthorization,
        note: &str,
    ) -> Result<(), StoreError>;
}
