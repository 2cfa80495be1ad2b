//! Sale, customer, payment and credit-note domain types.
//!
//! These are the read-only inputs consumed by the ledger and the fiscal
//! bridge. Persistence and mutation live in the database layer.

pub mod types;

#[cfg(test)]
pub mod test_support;

pub use types::{
    CreditNote, Customer, InvoiceType, InvoicingState, IvaRate, Payment, PaymentMethod, Sale,
    SaleItem, SaleStatus, SaleTotals, TaxCategory, aggregate_totals,
};
