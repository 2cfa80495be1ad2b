//! Internal document numbers drawn from `PostgreSQL` sequences.
//!
//! `nextval` never hands the same value to two callers, so numbers are
//! unique under concurrency; a rolled-back document leaves a gap, which
//! is acceptable for internal numbering.

use sea_orm::{ConnectionTrait, DbBackend, DbErr, FromQueryResult, Statement};

#[derive(Debug, FromQueryResult)]
struct NextValue {
    value: i64,
}

/// Draws the next value from a named sequence.
pub(crate) async fn next_sequence_value<C: ConnectionTrait>(
    db: &C,
    sequence: &'static str,
) -> Result<i64, DbErr> {
    let row = NextValue::find_by_statement(Statement::from_string(
        DbBackend::Postgres,
        format!("SELECT nextval('{sequence}') AS value"),
    ))
    .one(db)
    .await?
    .ok_or_else(|| DbErr::Custom(format!("sequence {sequence} returned no row")))?;
    Ok(row.value)
}

/// Formats a sale number ("V-00000042").
pub(crate) fn sale_number(value: i64) -> String {
    format!("V-{value:08}")
}

/// Formats a payment number ("PAG-000013").
pub(crate) fn payment_number(value: i64) -> String {
    format!("PAG-{value:06}")
}

/// Formats a credit note number ("NC-000007").
pub(crate) fn credit_note_number(value: i64) -> String {
    format!("NC-{value:06}")
}
