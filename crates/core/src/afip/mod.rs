//! AFIP electronic invoicing bridge (WSFEv1).
//!
//! Pure mapping from domain sales to the authority's voucher schema,
//! pre-flight validation, and the outbound gateway client. The stateful
//! orchestration lives in [`crate::invoicing`].

pub mod client;
pub mod codes;
pub mod error;
pub mod mapper;
pub mod request;
pub mod validation;

pub use client::{AfipClient, AfipHttpClient};
pub use error::AfipError;
pub use mapper::{format_full_number, map_sale};
pub use request::{
    IvaBucket, ServerStatus, VoucherAuthorization, VoucherInfo, VoucherRequest, VoucherTypeInfo,
};
pub use validation::{FiscalValidationError, validate_sale};
