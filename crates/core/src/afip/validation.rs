//! Pre-flight validation of a sale before contacting the authority.
//!
//! All applicable violations are accumulated and returned together, so
//! a caller can present the complete list instead of one at a time.

use bdn_shared::types::within_one_cent;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::sales::{Customer, Sale, TaxCategory};

/// Highest point-of-sale code the authority accepts.
pub const MAX_POINT_OF_SALE: u32 = 9998;

/// One reason a sale cannot be submitted for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FiscalValidationError {
    /// The customer has no fiscal classification.
    #[error("customer has no fiscal classification")]
    MissingTaxCategory,

    /// A non-final-consumer customer is missing its tax identifier.
    #[error("customer classification requires a tax identifier")]
    MissingTaxId,

    /// The sale total is zero or negative.
    #[error("sale total must be positive, got {0}")]
    NonPositiveTotal(Decimal),

    /// The fiscal component sum strays more than one cent from the total.
    #[error("fiscal components sum to {components} but sale total is {total}")]
    ArithmeticMismatch {
        /// Sum of taxed, untaxed, exempt, IVA, and perception amounts.
        components: Decimal,
        /// Recorded sale total.
        total: Decimal,
    },

    /// The point-of-sale code is outside the authority's valid range.
    #[error("point of sale {0} is outside 1..={MAX_POINT_OF_SALE}")]
    InvalidPointOfSale(u32),

    /// The sale has no line items.
    #[error("sale has no line items")]
    NoItems,
}

/// Checks a sale against every submission requirement at once.
///
/// # Errors
///
/// Returns the full list of violations; an empty `Ok(())` means the sale
/// may be mapped and submitted.
pub fn validate_sale(sale: &Sale, customer: &Customer) -> Result<(), Vec<FiscalValidationError>> {
    let mut errors = Vec::new();

    match customer.tax_category {
        None => errors.push(FiscalValidationError::MissingTaxCategory),
        Some(category) => {
            let has_tax_id = customer
                .tax_id
                .as_deref()
                .is_some_and(|id| !id.trim().is_empty());
            if category != TaxCategory::FinalConsumer && !has_tax_id {
                errors.push(FiscalValidationError::MissingTaxId);
            }
        }
    }

    if sale.total <= Decimal::ZERO {
        errors.push(FiscalValidationError::NonPositiveTotal(sale.total));
    }

    let components = sale.fiscal_components_total();
    if !within_one_cent(components, sale.total) {
        errors.push(FiscalValidationError::ArithmeticMismatch {
            components,
            total: sale.total,
        });
    }

    if sale.point_of_sale == 0 || sale.point_of_sale > MAX_POINT_OF_SALE {
        errors.push(FiscalValidationError::InvalidPointOfSale(sale.point_of_sale));
    }

    if sale.items.is_empty() {
        errors.push(FiscalValidationError::NoItems);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
