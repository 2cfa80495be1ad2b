//! Core business logic for BDN.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies; the one outbound collaborator is the ARCA/AFIP gateway
//! client in [`afip::client`].
//!
//! # Modules
//!
//! - `ledger` - Customer current-account ledger with running balances
//! - `sales` - Sale, customer, payment and credit-note domain types
//! - `afip` - WSFEv1 voucher mapping, validation and gateway client
//! - `invoicing` - Invoice issuance orchestration and state machine

pub mod afip;
pub mod invoicing;
pub mod ledger;
pub mod sales;
