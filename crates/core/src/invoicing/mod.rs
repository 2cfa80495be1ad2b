//! Invoicing orchestration.
//!
//! Takes a sale from "needs invoicing" to "invoiced", contacting the
//! authority exactly once per sale:
//! - Eligibility guards and pre-flight validation
//! - Per point-of-sale voucher numbering, serialized in-process
//! - Single-shot authorization and the recording of its result
//! - Diagnostic reads (voucher status, parameter tables, health)

pub mod error;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod service_tests;

pub use error::InvoicingError;
pub use service::InvoicingService;
pub use store::{SaleStore, StoreError};
pub use types::{InvoiceStatusReport, IssuedInvoice, RecordedAuthorization};
