//! `SeaORM` Entity for the ledger_entries table.
//!
//! Rows are append-only; only the balance-recompute repair rewrites the
//! two balance columns, in `seq` order.

use bdn_core::ledger::LedgerEntry;
use bdn_shared::types::{CreditNoteId, CustomerId, LedgerEntryId, PaymentId, SaleId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LedgerDirection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub seq: i64,
    pub direction: LedgerDirection,
    pub concept: String,
    pub amount: Decimal,
    pub previous_balance: Decimal,
    pub running_balance: Decimal,
    pub occurred_at: Date,
    pub created_at: DateTimeWithTimeZone,
    pub reference: Option<String>,
    pub sale_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub credit_note_id: Option<Uuid>,
    pub reverses_entry_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(
        belongs_to = "super::sales::Entity",
        from = "Column::SaleId",
        to = "super::sales::Column::Id"
    )]
    Sales,
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id"
    )]
    Payments,
    #[sea_orm(
        belongs_to = "super::credit_notes::Entity",
        from = "Column::CreditNoteId",
        to = "super::credit_notes::Column::Id"
    )]
    CreditNotes,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LedgerEntry {
    fn from(model: Model) -> Self {
        Self {
            id: LedgerEntryId::from_uuid(model.id),
            customer_id: CustomerId::from_uuid(model.customer_id),
            seq: model.seq,
            direction: model.direction.into(),
            concept: model.concept,
            amount: model.amount,
            previous_balance: model.previous_balance,
            running_balance: model.running_balance,
            occurred_at: model.occurred_at,
            created_at: model.created_at.with_timezone(&chrono::Utc),
            reference: model.reference,
            sale_id: model.sale_id.map(SaleId::from_uuid),
            payment_id: model.payment_id.map(PaymentId::from_uuid),
            credit_note_id: model.credit_note_id.map(CreditNoteId::from_uuid),
            reverses_entry_id: model.reverses_entry_id.map(LedgerEntryId::from_uuid),
        }
    }
}
