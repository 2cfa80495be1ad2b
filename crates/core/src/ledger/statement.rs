//! Account statement assembly.

use rust_decimal::Decimal;
use serde::Serialize;

use super::entry::LedgerEntry;
use bdn_shared::types::CustomerId;

/// A customer's account statement: recent movements plus the current
/// balance.
///
/// Entries are ordered by business date descending (newest first), with
/// the per-customer sequence number as tie breaker for same-day
/// movements; the balance always comes from the most recently inserted
/// entry regardless of the statement window.
#[derive(Debug, Clone, Serialize)]
pub struct Statement {
    /// The customer the statement belongs to.
    pub customer_id: CustomerId,
    /// The most recent movements, newest first.
    pub entries: Vec<LedgerEntry>,
    /// Current balance. Positive = customer owes money.
    pub balance: Decimal,
}

impl Statement {
    /// True when the customer owes money (balance > 0).
    #[must_use]
    pub fn is_in_debt(&self) -> bool {
        self.balance > Decimal::ZERO
    }

    /// True when the customer has credit in their favor (balance < 0).
    #[must_use]
    pub fn is_in_credit(&self) -> bool {
        self.balance < Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_statement(balance: Decimal) -> Statement {
        Statement {
            customer_id: CustomerId::new(),
            entries: vec![],
            balance,
        }
    }

    #[test]
    fn test_in_debt() {
        let statement = make_statement(dec!(1500));
        assert!(statement.is_in_debt());
        assert!(!statement.is_in_credit());
    }

    #[test]
    fn test_in_credit() {
        let statement = make_statement(dec!(-1500));
        assert!(!statement.is_in_debt());
        assert!(statement.is_in_credit());
    }

    #[test]
    fn test_settled() {
        let statement = make_statement(dec!(0));
        assert!(!statement.is_in_debt());
        assert!(!statement.is_in_credit());
    }
}
