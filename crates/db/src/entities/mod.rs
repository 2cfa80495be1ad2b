//! `SeaORM` entity definitions.

pub mod credit_notes;
pub mod customers;
pub mod ledger_entries;
pub mod payments;
pub mod sale_items;
pub mod sales;
pub mod sea_orm_active_enums;
