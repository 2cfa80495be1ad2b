//! `SeaORM` Entity for the payments table.

use bdn_core::sales as domain;
use bdn_shared::types::{CustomerId, PaymentId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PaymentMethod;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub number: String,
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub payment_date: Date,
    pub reference: Option<String>,
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
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for domain::Payment {
    fn from(model: Model) -> Self {
        Self {
            id: PaymentId::from_uuid(model.id),
            number: model.number,
            customer_id: CustomerId::from_uuid(model.customer_id),
            amount: model.amount,
            method: model.method.into(),
            payment_date: model.payment_date,
            reference: model.reference,
        }
    }
}
