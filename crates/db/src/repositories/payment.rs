//! Payment repository.
//!
//! Registering a payment only records the document; the credit movement
//! on the customer's account goes through the ledger repository.

use bdn_core::sales as domain;
use bdn_shared::types::PaymentId;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::{customers, payments};

use super::numbering;

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Customer exists but takes no new documents.
    #[error("Customer {0} is inactive")]
    CustomerInactive(Uuid),

    /// Amount must be positive.
    #[error("Payment amount {0} is not positive")]
    NonPositiveAmount(Decimal),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for registering a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// Paying customer.
    pub customer_id: Uuid,
    /// Amount received; must be positive.
    pub amount: Decimal,
    /// How the payment was received.
    pub method: domain::PaymentMethod,
    /// Business date of the payment.
    pub payment_date: NaiveDate,
    /// External reference (transfer id, check number).
    pub reference: Option<String>,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a payment received from a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the customer is
    /// missing or inactive, or the insert fails.
    pub async fn create(&self, input: CreatePaymentInput) -> Result<domain::Payment, PaymentError> {
        if input.amount <= Decimal::ZERO {
            return Err(PaymentError::NonPositiveAmount(input.amount));
        }

        let customer = customers::Entity::find_by_id(input.customer_id)
            .one(&self.db)
            .await?
            .ok_or(PaymentError::CustomerNotFound(input.customer_id))?;
        if !customer.is_active {
            return Err(PaymentError::CustomerInactive(input.customer_id));
        }

        let number = numbering::payment_number(
            numbering::next_sequence_value(&self.db, "payment_number_seq").await?,
        );

        let now = Utc::now();
        let payment = payments::ActiveModel {
            id: Set(PaymentId::new().into_inner()),
            number: Set(number),
            customer_id: Set(input.customer_id),
            amount: Set(input.amount),
            method: Set(input.method.into()),
            payment_date: Set(input.payment_date),
            reference: Set(input.reference),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let payment = payment.insert(&self.db).await?;
        Ok(payment.into())
    }
}
