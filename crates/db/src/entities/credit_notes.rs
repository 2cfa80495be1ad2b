//! `SeaORM` Entity for the credit_notes table.

use bdn_core::sales as domain;
use bdn_shared::types::{CreditNoteId, CustomerId, SaleId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub number: String,
    pub customer_id: Uuid,
    pub sale_id: Option<Uuid>,
    pub amount: Decimal,
    pub reason: String,
    pub note_date: Date,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for domain::CreditNote {
    fn from(model: Model) -> Self {
        Self {
            id: CreditNoteId::from_uuid(model.id),
            number: model.number,
            customer_id: CustomerId::from_uuid(model.customer_id),
            sale_id: model.sale_id.map(SaleId::from_uuid),
            amount: model.amount,
            reason: model.reason,
            note_date: model.note_date,
        }
    }
}
