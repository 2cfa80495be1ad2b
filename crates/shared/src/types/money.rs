//! Money helpers.
//!
//! CRITICAL: Never use floating-point for money calculations; all
//! monetary arithmetic uses `rust_decimal::Decimal` (floats are denied
//! workspace-wide). Amounts reported to the fiscal authority are rounded
//! to 2 decimal places with Banker's Rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a value to 2 decimal places using Banker's Rounding
/// (`MidpointNearestEven`).
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// True when two amounts differ by at most one cent.
///
/// This is the tolerance used when reconciling a sale's fiscal component
/// sum against its stored total.
#[must_use]
pub fn within_one_cent(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= Decimal::new(1, 2)
}
