//! Ledger entry domain types.

use bdn_shared::types::{CreditNoteId, CustomerId, LedgerEntryId, PaymentId, SaleId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::Direction;

/// A single movement in a customer's current account.
///
/// Entries are append-only: once written, `amount`, `direction` and the
/// balance fields are never mutated except by the recompute repair
/// operation, which rewrites balances for the whole account in `seq`
/// order. Reversals are new opposite-direction entries linked through
/// `reverses_entry_id`, never deletions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: LedgerEntryId,
    /// The customer whose account this entry belongs to.
    pub customer_id: CustomerId,
    /// Position in the customer's account, starting at 1.
    ///
    /// This is the authoritative ordering key for balance computation;
    /// `created_at` is metadata only.
    pub seq: i64,
    /// Whether the entry increases (debe) or decreases (haber) the debt.
    pub direction: Direction,
    /// Human-readable description of the originating event.
    pub concept: String,
    /// Positive monetary magnitude; the sign is carried by `direction`.
    pub amount: Decimal,
    /// Balance before this entry was applied.
    pub previous_balance: Decimal,
    /// Balance immediately after this entry. Positive = customer owes.
    pub running_balance: Decimal,
    /// Business date of the movement (may differ from insertion time).
    pub occurred_at: NaiveDate,
    /// Insertion timestamp.
    pub created_at: DateTime<Utc>,
    /// Optional external document identifier (sale or payment number).
    pub reference: Option<String>,
    /// Originating sale, when posted by a sale confirmation.
    pub sale_id: Option<SaleId>,
    /// Originating payment, when posted by a payment registration.
    pub payment_id: Option<PaymentId>,
    /// Originating credit note, when posted by a credit-note issuance.
    pub credit_note_id: Option<CreditNoteId>,
    /// The entry this one reverses, for credit-note corrections.
    pub reverses_entry_id: Option<LedgerEntryId>,
}

impl LedgerEntry {
    /// Returns the signed balance change (positive for debit, negative
    /// for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.direction.signed(self.amount)
    }

    /// True when the balance arithmetic of this entry is internally
    /// consistent: `running_balance == previous_balance ± amount`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.running_balance == self.previous_balance + self.signed_amount()
    }
}
