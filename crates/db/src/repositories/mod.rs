//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod credit_note;
pub mod customer;
pub mod ledger;
mod numbering;
pub mod payment;
pub mod sale;

pub use credit_note::{CreateCreditNoteInput, CreditNoteError, CreditNoteRepository};
pub use customer::{CreateCustomerInput, CustomerError, CustomerRepository, UpdateCustomerInput};
pub use ledger::LedgerRepository;
pub use payment::{CreatePaymentInput, PaymentError, PaymentRepository};
pub use sale::{CreateSaleInput, CreateSaleItemInput, SaleError, SaleRepository};
