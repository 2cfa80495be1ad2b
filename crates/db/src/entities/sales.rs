//! `SeaORM` Entity for the sales table.

use bdn_core::sales as domain;
use bdn_shared::types::{CustomerId, SaleId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{InvoiceType, InvoicingState, SaleStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub number: String,
    pub customer_id: Uuid,
    pub status: SaleStatus,
    pub is_white: bool,
    pub sale_date: Date,
    pub invoice_type: InvoiceType,
    pub point_of_sale: i32,
    pub taxed_net: Decimal,
    pub untaxed_net: Decimal,
    pub exempt_amount: Decimal,
    pub iva_amount: Decimal,
    pub gross_income_perception: Decimal,
    pub total: Decimal,
    pub invoicing_state: InvoicingState,
    pub invoice_number: Option<i64>,
    pub invoice_full_number: Option<String>,
    pub cae: Option<String>,
    pub cae_expiry: Option<Date>,
    pub invoicing_note: Option<String>,
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
    #[sea_orm(has_many = "super::sale_items::Entity")]
    SaleItems,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::sale_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row plus its line items into the domain `Sale`.
    ///
    /// A point-of-sale value outside `u32` collapses to 0, which the
    /// fiscal validation then rejects.
    #[must_use]
    pub fn into_domain(self, items: Vec<super::sale_items::Model>) -> domain::Sale {
        domain::Sale {
            id: SaleId::from_uuid(self.id),
            number: self.number,
            customer_id: CustomerId::from_uuid(self.customer_id),
            status: self.status.into(),
            is_white: self.is_white,
            sale_date: self.sale_date,
            invoice_type: self.invoice_type.into(),
            point_of_sale: u32::try_from(self.point_of_sale).unwrap_or(0),
            taxed_net: self.taxed_net,
            untaxed_net: self.untaxed_net,
            exempt_amount: self.exempt_amount,
            iva_amount: self.iva_amount,
            gross_income_perception: self.gross_income_perception,
            total: self.total,
            invoicing_state: self.invoicing_state.into(),
            invoice_number: self.invoice_number,
            invoice_full_number: self.invoice_full_number,
            cae: self.cae,
            cae_expiry: self.cae_expiry,
            invoicing_note: self.invoicing_note,
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}
