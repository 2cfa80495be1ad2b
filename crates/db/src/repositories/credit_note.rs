//! Credit note repository.
//!
//! A credit note corrects a customer's account in their favor, either
//! against a specific sale or free-standing. Like payments, the credit
//! movement itself is posted through the ledger repository.

use bdn_core::sales as domain;
use bdn_shared::types::CreditNoteId;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::{credit_notes, customers, ledger_entries, sales};

use super::numbering;

/// Error types for credit note operations.
#[derive(Debug, thiserror::Error)]
pub enum CreditNoteError {
    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Customer exists but takes no new documents.
    #[error("Customer {0} is inactive")]
    CustomerInactive(Uuid),

    /// Referenced sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(Uuid),

    /// Referenced sale belongs to another customer.
    #[error("Sale {sale_id} does not belong to customer {customer_id}")]
    SaleCustomerMismatch {
        /// Sale the note points at.
        sale_id: Uuid,
        /// Customer the note was issued for.
        customer_id: Uuid,
    },

    /// Ledger entry named as the reversal target not found.
    #[error("Ledger entry not found: {0}")]
    ReversedEntryNotFound(Uuid),

    /// Reversal target belongs to another customer.
    #[error("Ledger entry {entry_id} does not belong to customer {customer_id}")]
    ReversedEntryMismatch {
        /// Entry the note claims to reverse.
        entry_id: Uuid,
        /// Customer the note was issued for.
        customer_id: Uuid,
    },

    /// Amount must be positive.
    #[error("Credit note amount {0} is not positive")]
    NonPositiveAmount(Decimal),

    /// Reason is blank.
    #[error("Credit note reason cannot be empty")]
    EmptyReason,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for issuing a credit note.
#[derive(Debug, Clone)]
pub struct CreateCreditNoteInput {
    /// Benefiting customer.
    pub customer_id: Uuid,
    /// Sale being corrected, if the note relates to one.
    pub sale_id: Option<Uuid>,
    /// Amount credited; must be positive.
    pub amount: Decimal,
    /// Why the note is issued.
    pub reason: String,
    /// Business date of the note.
    pub note_date: NaiveDate,
    /// Ledger entry this note reverses, when the caller pins one.
    ///
    /// Validated here so a bad link is rejected before the note row is
    /// inserted; the link itself is written by the ledger posting.
    pub reverses_entry_id: Option<Uuid>,
}

/// Credit note repository.
#[derive(Debug, Clone)]
pub struct CreditNoteRepository {
    db: DatabaseConnection,
}

impl CreditNoteRepository {
    /// Creates a new credit note repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issues a credit note for a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the reason is
    /// blank, the customer is missing or inactive, a referenced sale or
    /// reversal entry is missing or belongs to another customer, or the
    /// insert fails.
    pub async fn create(
        &self,
        input: CreateCreditNoteInput,
    ) -> Result<domain::CreditNote, CreditNoteError> {
        if input.amount <= Decimal::ZERO {
            return Err(CreditNoteError::NonPositiveAmount(input.amount));
        }
        if input.reason.trim().is_empty() {
            return Err(CreditNoteError::EmptyReason);
        }

        let customer = customers::Entity::find_by_id(input.customer_id)
            .one(&self.db)
            .await?
            .ok_or(CreditNoteError::CustomerNotFound(input.customer_id))?;
        if !customer.is_active {
            return Err(CreditNoteError::CustomerInactive(input.customer_id));
        }

        if let Some(sale_id) = input.sale_id {
            let sale = sales::Entity::find_by_id(sale_id)
                .one(&self.db)
                .await?
                .ok_or(CreditNoteError::SaleNotFound(sale_id))?;
            if sale.customer_id != input.customer_id {
                return Err(CreditNoteError::SaleCustomerMismatch {
                    sale_id,
                    customer_id: input.customer_id,
                });
            }
        }

        if let Some(entry_id) = input.reverses_entry_id {
            let entry = ledger_entries::Entity::find_by_id(entry_id)
                .one(&self.db)
                .await?
                .ok_or(CreditNoteError::ReversedEntryNotFound(entry_id))?;
            if entry.customer_id != input.customer_id {
                return Err(CreditNoteError::ReversedEntryMismatch {
                    entry_id,
                    customer_id: input.customer_id,
                });
            }
        }

        let number = numbering::credit_note_number(
            numbering::next_sequence_value(&self.db, "credit_note_number_seq").await?,
        );

        let now = Utc::now();
        let note = credit_notes::ActiveModel {
            id: Set(CreditNoteId::new().into_inner()),
            number: Set(number),
            customer_id: Set(input.customer_id),
            sale_id: Set(input.sale_id),
            amount: Set(input.amount),
            reason: Set(input.reason),
            note_date: Set(input.note_date),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let note = note.insert(&self.db).await?;
        Ok(note.into())
    }
}
