//! Movement domain types for posting to the current account.
//!
//! Every balance-affecting event in the system (sale confirmation,
//! payment registration, credit-note issuance, manual adjustment) is
//! expressed as a [`MovementInput`] and recorded through the single
//! posting operation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entry::LedgerEntry;
use crate::sales::{CreditNote, Payment, Sale};

/// Direction of a current-account movement.
///
/// `Debit` ("debe") increases what the customer owes; `Credit` ("haber")
/// decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Increases the amount owed.
    Debit,
    /// Decreases the amount owed.
    Credit,
}

impl Direction {
    /// Applies the direction's sign to a positive magnitude.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Debit => amount,
            Self::Credit => -amount,
        }
    }

    /// Returns the lowercase string form used in storage and APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

/// Input for posting a single movement to a customer's account.
///
/// The amount must be a positive magnitude; the sign is carried by
/// `direction`. See [`crate::ledger::validate_movement`].
#[derive(Debug, Clone)]
pub struct MovementInput {
    /// The customer whose account is affected.
    pub customer_id: Uuid,
    /// Whether the movement increases or decreases the debt.
    pub direction: Direction,
    /// Human-readable description of the originating event.
    pub concept: String,
    /// Positive monetary magnitude.
    pub amount: Decimal,
    /// Business date of the movement.
    pub occurred_at: NaiveDate,
    /// Optional external document identifier (sale or payment number).
    pub reference: Option<String>,
    /// Originating sale, if any.
    pub sale_id: Option<Uuid>,
    /// Originating payment, if any.
    pub payment_id: Option<Uuid>,
    /// Originating credit note, if any.
    pub credit_note_id: Option<Uuid>,
    /// Entry this movement reverses, for credit-note corrections.
    pub reverses_entry_id: Option<Uuid>,
}

impl MovementInput {
    /// Creates a bare movement with no document links.
    #[must_use]
    pub fn new(
        customer_id: Uuid,
        direction: Direction,
        concept: impl Into<String>,
        amount: Decimal,
        occurred_at: NaiveDate,
    ) -> Self {
        Self {
            customer_id,
            direction,
            concept: concept.into(),
            amount,
            occurred_at,
            reference: None,
            sale_id: None,
            payment_id: None,
            credit_note_id: None,
            reverses_entry_id: None,
        }
    }

    /// Builds the debit movement for a confirmed sale.
    ///
    /// Callers must check the sale status first; the sale-posting wrapper
    /// skips unconfirmed sales entirely.
    #[must_use]
    pub fn for_sale(sale: &Sale) -> Self {
        Self {
            customer_id: sale.customer_id.into_inner(),
            direction: Direction::Debit,
            concept: format!("Venta {}", sale.number),
            amount: sale.total,
            occurred_at: sale.sale_date,
            reference: Some(sale.number.clone()),
            sale_id: Some(sale.id.into_inner()),
            payment_id: None,
            credit_note_id: None,
            reverses_entry_id: None,
        }
    }

    /// Builds the credit movement for a registered payment.
    #[must_use]
    pub fn for_payment(payment: &Payment) -> Self {
        Self {
            customer_id: payment.customer_id.into_inner(),
            direction: Direction::Credit,
            concept: format!("Pago {}", payment.number),
            amount: payment.amount,
            occurred_at: payment.payment_date,
            reference: Some(payment.number.clone()),
            sale_id: None,
            payment_id: Some(payment.id.into_inner()),
            credit_note_id: None,
            reverses_entry_id: None,
        }
    }

    /// Builds the credit movement for an issued credit note.
    ///
    /// `reverses_entry_id` links the movement to the ledger entry being
    /// corrected, when the caller knows it.
    #[must_use]
    pub fn for_credit_note(note: &CreditNote, reverses_entry_id: Option<Uuid>) -> Self {
        Self {
            customer_id: note.customer_id.into_inner(),
            direction: Direction::Credit,
            concept: format!("Nota de crédito {}", note.number),
            amount: note.amount,
            occurred_at: note.note_date,
            reference: Some(note.number.clone()),
            sale_id: note.sale_id.map(bdn_shared::types::SaleId::into_inner),
            payment_id: None,
            credit_note_id: Some(note.id.into_inner()),
            reverses_entry_id,
        }
    }
}

/// Result of a successful posting.
#[derive(Debug, Clone, Serialize)]
pub struct PostedMovement {
    /// The newly inserted entry.
    pub entry: LedgerEntry,
    /// Balance before the entry was applied.
    pub previous_balance: Decimal,
    /// Balance after the entry.
    pub new_balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_direction_signed() {
        assert_eq!(Direction::Debit.signed(dec!(100)), dec!(100));
        assert_eq!(Direction::Credit.signed(dec!(100)), dec!(-100));
    }

    #[test]
    fn test_direction_as_str() {
        assert_eq!(Direction::Debit.as_str(), "debit");
        assert_eq!(Direction::Credit.as_str(), "credit");
    }

    #[test]
    fn test_for_sale_builds_debit() {
        let sale = crate::sales::test_support::sale_fixture();
        let input = MovementInput::for_sale(&sale);

        assert_eq!(input.direction, Direction::Debit);
        assert_eq!(input.amount, sale.total);
        assert_eq!(input.concept, format!("Venta {}", sale.number));
        assert_eq!(input.reference.as_deref(), Some(sale.number.as_str()));
        assert_eq!(input.sale_id, Some(sale.id.into_inner()));
        assert_eq!(input.payment_id, None);
    }

    #[test]
    fn test_for_payment_builds_credit() {
        let payment = crate::sales::test_support::payment_fixture();
        let input = MovementInput::for_payment(&payment);

        assert_eq!(input.direction, Direction::Credit);
        assert_eq!(input.amount, payment.amount);
        assert_eq!(input.concept, format!("Pago {}", payment.number));
        assert_eq!(input.payment_id, Some(payment.id.into_inner()));
        assert_eq!(input.sale_id, None);
    }

    #[test]
    fn test_for_credit_note_links_reversed_entry() {
        let note = crate::sales::test_support::credit_note_fixture();
        let reversed = Uuid::now_v7();
        let input = MovementInput::for_credit_note(&note, Some(reversed));

        assert_eq!(input.direction, Direction::Credit);
        assert_eq!(input.credit_note_id, Some(note.id.into_inner()));
        assert_eq!(input.reverses_entry_id, Some(reversed));
    }
}
