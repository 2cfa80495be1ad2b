//! `SeaORM` active enums mirroring the PostgreSQL enum types.
//!
//! Each enum converts to and from its `bdn-core` counterpart so the
//! repositories can hand out domain types.

use bdn_core::ledger::Direction;
use bdn_core::sales as domain;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "tax_category")]
pub enum TaxCategory {
    #[sea_orm(string_value = "registered_responsible")]
    RegisteredResponsible,
    #[sea_orm(string_value = "monotax")]
    Monotax,
    #[sea_orm(string_value = "exempt")]
    Exempt,
    #[sea_orm(string_value = "final_consumer")]
    FinalConsumer,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "sale_status")]
pub enum SaleStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_type")]
pub enum InvoiceType {
    #[sea_orm(string_value = "a")]
    A,
    #[sea_orm(string_value = "b")]
    B,
    #[sea_orm(string_value = "c")]
    C,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "iva_rate")]
pub enum IvaRate {
    #[sea_orm(string_value = "zero")]
    Zero,
    #[sea_orm(string_value = "ten_half")]
    TenHalf,
    #[sea_orm(string_value = "twenty_one")]
    TwentyOne,
    #[sea_orm(string_value = "twenty_seven")]
    TwentySeven,
    #[sea_orm(string_value = "exempt")]
    Exempt,
    #[sea_orm(string_value = "not_taxed")]
    NotTaxed,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoicing_state")]
pub enum InvoicingState {
    #[sea_orm(string_value = "uninvoiced")]
    Uninvoiced,
    #[sea_orm(string_value = "invoiced")]
    Invoiced,
    #[sea_orm(string_value = "authorized_unrecorded")]
    AuthorizedUnrecorded,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "transfer")]
    Transfer,
    #[sea_orm(string_value = "check")]
    Check,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_direction")]
pub enum LedgerDirection {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

impl From<TaxCategory> for domain::TaxCategory {
    fn from(value: TaxCategory) -> Self {
        match value {
            TaxCategory::RegisteredResponsible => Self::RegisteredResponsible,
            TaxCategory::Monotax => Self::Monotax,
            TaxCategory::Exempt => Self::Exempt,
            TaxCategory::FinalConsumer => Self::FinalConsumer,
        }
    }
}

impl From<domain::TaxCategory> for TaxCategory {
    fn from(value: domain::TaxCategory) -> Self {
        match value {
            domain::TaxCategory::RegisteredResponsible => Self::RegisteredResponsible,
            domain::TaxCategory::Monotax => Self::Monotax,
            domain::TaxCategory::Exempt => Self::Exempt,
            domain::TaxCategory::FinalConsumer => Self::FinalConsumer,
        }
    }
}

impl From<SaleStatus> for domain::SaleStatus {
    fn from(value: SaleStatus) -> Self {
        match value {
            SaleStatus::Draft => Self::Draft,
            SaleStatus::Confirmed => Self::Confirmed,
            SaleStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<domain::SaleStatus> for SaleStatus {
    fn from(value: domain::SaleStatus) -> Self {
        match value {
            domain::SaleStatus::Draft => Self::Draft,
            domain::SaleStatus::Confirmed => Self::Confirmed,
            domain::SaleStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<InvoiceType> for domain::InvoiceType {
    fn from(value: InvoiceType) -> Self {
        match value {
            InvoiceType::A => Self::A,
            InvoiceType::B => Self::B,
            InvoiceType::C => Self::C,
        }
    }
}

impl From<domain::InvoiceType> for InvoiceType {
    fn from(value: domain::InvoiceType) -> Self {
        match value {
            domain::InvoiceType::A => Self::A,
            domain::InvoiceType::B => Self::B,
            domain::InvoiceType::C => Self::C,
        }
    }
}

impl From<IvaRate> for domain::IvaRate {
    fn from(value: IvaRate) -> Self {
        match value {
            IvaRate::Zero => Self::Zero,
            IvaRate::TenHalf => Self::TenHalf,
            IvaRate::TwentyOne => Self::TwentyOne,
            IvaRate::TwentySeven => Self::TwentySeven,
            IvaRate::Exempt => Self::Exempt,
            IvaRate::NotTaxed => Self::NotTaxed,
        }
    }
}

impl From<domain::IvaRate> for IvaRate {
    fn from(value: domain::IvaRate) -> Self {
        match value {
            domain::IvaRate::Zero => Self::Zero,
            domain::IvaRate::TenHalf => Self::TenHalf,
            domain::IvaRate::TwentyOne => Self::TwentyOne,
            domain::IvaRate::TwentySeven => Self::TwentySeven,
            domain::IvaRate::Exempt => Self::Exempt,
            domain::IvaRate::NotTaxed => Self::NotTaxed,
        }
    }
}

impl From<InvoicingState> for domain::InvoicingState {
    fn from(value: InvoicingState) -> Self {
        match value {
            InvoicingState::Uninvoiced => Self::Uninvoiced,
            InvoicingState::Invoiced => Self::Invoiced,
            InvoicingState::AuthorizedUnrecorded => Self::AuthorizedUnrecorded,
        }
    }
}

impl From<domain::InvoicingState> for InvoicingState {
    fn from(value: domain::InvoicingState) -> Self {
        match value {
            domain::InvoicingState::Uninvoiced => Self::Uninvoiced,
            domain::InvoicingState::Invoiced => Self::Invoiced,
            domain::InvoicingState::AuthorizedUnrecorded => Self::AuthorizedUnrecorded,
        }
    }
}

impl From<PaymentMethod> for domain::PaymentMethod {
    fn from(value: PaymentMethod) -> Self {
        match value {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Transfer => Self::Transfer,
            PaymentMethod::Check => Self::Check,
            PaymentMethod::Other => Self::Other,
        }
    }
}

impl From<domain::PaymentMethod> for PaymentMethod {
    fn from(value: domain::PaymentMethod) -> Self {
        match value {
            domain::PaymentMethod::Cash => Self::Cash,
            domain::PaymentMethod::Transfer => Self::Transfer,
            domain::PaymentMethod::Check => Self::Check,
            domain::PaymentMethod::Other => Self::Other,
        }
    }
}

impl From<LedgerDirection> for Direction {
    fn from(value: LedgerDirection) -> Self {
        match value {
            LedgerDirection::Debit => Self::Debit,
            LedgerDirection::Credit => Self::Credit,
        }
    }
}

impl From<Direction> for LedgerDirection {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Debit => Self::Debit,
            Direction::Credit => Self::Credit,
        }
    }
}
