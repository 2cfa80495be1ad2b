//! `SeaORM` Entity for the sale_items table.

use bdn_core::sales as domain;
use bdn_shared::types::{SaleId, SaleItemId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::IvaRate;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "sale_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sale_id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub iva_rate: IvaRate,
    pub net_amount: Decimal,
    pub iva_amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales::Entity",
        from = "Column::SaleId",
        to = "super::sales::Column::Id"
    )]
    Sales,
}

impl Related<super::sales::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for domain::SaleItem {
    fn from(model: Model) -> Self {
        Self {
            id: SaleItemId::from_uuid(model.id),
            sale_id: SaleId::from_uuid(model.sale_id),
            description: model.description,
            quantity: model.quantity,
            unit_price: model.unit_price,
            iva_rate: model.iva_rate.into(),
            net_amount: model.net_amount,
            iva_amount: model.iva_amount,
        }
    }
}
