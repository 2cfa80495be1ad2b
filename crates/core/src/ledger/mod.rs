//! Customer current-account ledger.
//!
//! This module implements the core ledger functionality:
//! - Movements (debits and credits against a customer's account)
//! - Running balance chains keyed by a per-customer sequence number
//! - Movement validation
//! - Statement assembly
//! - Pure balance replay backing the recompute/repair operation

pub mod balance;
pub mod entry;
pub mod error;
pub mod statement;
pub mod types;
pub mod validation;

pub use balance::{BalanceChain, replay};
pub use entry::LedgerEntry;
pub use error::LedgerError;
pub use statement::Statement;
pub use types::{Direction, MovementInput, PostedMovement};
pub use validation::validate_movement;
