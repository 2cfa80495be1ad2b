//! Business rule validation for ledger postings.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::MovementInput;

/// Validates a movement before it is posted.
///
/// The posting primitive enforces `amount > 0` itself instead of trusting
/// callers; the sign of a movement is carried exclusively by its
/// direction.
///
/// # Errors
///
/// Returns an error if the amount is not strictly positive or the
/// concept is blank.
pub fn validate_movement(input: &MovementInput) -> Result<(), LedgerError> {
    if input.amount == Decimal::ZERO {
        return Err(LedgerError::ZeroAmount);
    }
    if input.amount < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount);
    }
    if input.concept.trim().is_empty() {
        return Err(LedgerError::EmptyConcept);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::Direction;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn make_input(amount: Decimal) -> MovementInput {
        MovementInput::new(
            Uuid::now_v7(),
            Direction::Debit,
            "Venta V-00000001",
            amount,
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        )
    }

    #[test]
    fn test_positive_amount_passes() {
        assert!(validate_movement(&make_input(dec!(1000))).is_ok());
        assert!(validate_movement(&make_input(dec!(0.01))).is_ok());
    }

    #[test]
    fn test_zero_amount_rejected() {
        assert!(matches!(
            validate_movement(&make_input(dec!(0))),
            Err(LedgerError::ZeroAmount)
        ));
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert!(matches!(
            validate_movement(&make_input(dec!(-100))),
            Err(LedgerError::NegativeAmount)
        ));
    }

    #[test]
    fn test_blank_concept_rejected() {
        let mut input = make_input(dec!(100));
        input.concept = "   ".to_string();
        assert!(matches!(
            validate_movement(&input),
            Err(LedgerError::EmptyConcept)
        ));
    }
}
