//! Results of the invoicing workflow.

use bdn_shared::types::SaleId;
use chrono::NaiveDate;
use serde::Serialize;

use crate::afip::VoucherInfo;
use crate::sales::{InvoiceType, InvoicingState};

/// Authorization fields persisted onto a sale in one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAuthorization {
    /// Authority-assigned voucher number.
    pub voucher_number: i64,
    /// Formatted document number ("A 0001-00000042").
    pub full_number: String,
    /// Authorization code.
    pub cae: String,
    /// Date after which the CAE is no longer valid.
    pub cae_expiry: NaiveDate,
}

/// A successfully issued and recorded invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedInvoice {
    /// Sale the invoice belongs to.
    pub sale_id: SaleId,
    /// Invoice letter.
    pub invoice_type: InvoiceType,
    /// Issuing point of sale.
    pub point_of_sale: u32,
    /// Authority-assigned voucher number.
    pub voucher_number: i64,
    /// Formatted document number.
    pub full_number: String,
    /// Authorization code.
    pub cae: String,
    /// CAE expiry date.
    pub cae_expiry: NaiveDate,
    /// Non-fatal observations the authority attached.
    pub observations: Vec<String>,
}

/// Local and authority-side views of a sale's invoicing state.
///
/// Diagnostic only; produced without changing any state.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceStatusReport {
    /// Sale under inspection.
    pub sale_id: SaleId,
    /// Locally recorded state tag.
    pub state: InvoicingState,
    /// Authorization as recorded locally, when present.
    pub recorded: Option<RecordedAuthorization>,
    /// Voucher details as the authority reports them, when queried.
    pub authority: Option<VoucherInfo>,
    /// Whether local and authority CAEs agree, when both are known.
    pub matches: Option<bool>,
}
