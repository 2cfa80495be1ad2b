//! Sale repository: drafting, confirmation, and the conditional
//! invoicing-state writes behind the authorization workflow.
//!
//! Status flips are conditional updates filtered on the state they leave,
//! so two racing confirmations (or a recorded authorization racing a
//! competing writer) resolve to exactly one winner without row locks.

use bdn_core::invoicing::{RecordedAuthorization, SaleStore, StoreError};
use bdn_core::sales::{self as domain, aggregate_totals};
use bdn_shared::types::{CustomerId, SaleId, SaleItemId};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    customers, sale_items, sales,
    sea_orm_active_enums::{InvoicingState, SaleStatus},
};

use super::numbering;

/// Error types for sale operations.
#[derive(Debug, thiserror::Error)]
pub enum SaleError {
    /// Sale not found.
    #[error("Sale not found: {0}")]
    NotFound(Uuid),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Customer exists but takes no new documents.
    #[error("Customer {0} is inactive")]
    CustomerInactive(Uuid),

    /// A sale needs at least one line item.
    #[error("Sale has no line items")]
    NoItems,

    /// A line item failed validation.
    #[error("Line item {index}: {reason}")]
    InvalidItem {
        /// Zero-based position of the offending item.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Gross-income perception below zero.
    #[error("Gross income perception {0} is negative")]
    NegativePerception(Decimal),

    /// Point of sale outside the range the schema stores.
    #[error("Point of sale {0} is out of range")]
    PointOfSaleOutOfRange(u32),

    /// The sale was confirmed before; confirmation is one-shot.
    #[error("Sale {0} is already confirmed")]
    AlreadyConfirmed(Uuid),

    /// The sale was cancelled and no longer changes.
    #[error("Sale {0} is cancelled")]
    Cancelled(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a sale draft.
#[derive(Debug, Clone)]
pub struct CreateSaleInput {
    /// Buying customer.
    pub customer_id: Uuid,
    /// Business date of the sale.
    pub sale_date: NaiveDate,
    /// Declared ("white") sale, eligible for electronic invoicing.
    pub is_white: bool,
    /// Issuing point-of-sale code.
    pub point_of_sale: u32,
    /// Gross-income perception added on top of the line items.
    pub gross_income_perception: Decimal,
    /// Line items; at least one.
    pub items: Vec<CreateSaleItemInput>,
}

/// One line of a sale being created.
#[derive(Debug, Clone)]
pub struct CreateSaleItemInput {
    /// Free-text description of the product sold.
    pub description: String,
    /// Units sold; must be positive.
    pub quantity: Decimal,
    /// Net unit price; must not be negative.
    pub unit_price: Decimal,
    /// IVA rate category for the line.
    pub iva_rate: domain::IvaRate,
}

/// Sale repository for drafting and lifecycle operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    db: DatabaseConnection,
}

impl SaleRepository {
    /// Creates a new sale repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a sale draft with priced items and aggregated totals.
    ///
    /// The invoice letter is fixed at creation from the customer's tax
    /// category (B when the category is not set yet); totals come from
    /// the line items, so the fiscal components reconcile with the total
    /// by construction.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer is missing or inactive, the
    /// items fail validation, or the insert fails.
    pub async fn create(&self, input: CreateSaleInput) -> Result<domain::Sale, SaleError> {
        // 1. The customer must exist and take new documents
        let customer = customers::Entity::find_by_id(input.customer_id)
            .one(&self.db)
            .await?
            .ok_or(SaleError::CustomerNotFound(input.customer_id))?;
        if !customer.is_active {
            return Err(SaleError::CustomerInactive(input.customer_id));
        }

        // 2. Validate the inputs and price the line items
        if input.gross_income_perception < Decimal::ZERO {
            return Err(SaleError::NegativePerception(input.gross_income_perception));
        }
        let point_of_sale = i32::try_from(input.point_of_sale)
            .map_err(|_| SaleError::PointOfSaleOutOfRange(input.point_of_sale))?;
        let sale_id = SaleId::new();
        let items = price_items(sale_id, &input.items)?;

        // 3. Aggregate fiscal totals and derive the invoice letter
        let totals = aggregate_totals(&items, input.gross_income_perception);
        let invoice_type = customer
            .tax_category
            .map(domain::TaxCategory::from)
            .map_or(domain::InvoiceType::B, domain::TaxCategory::invoice_type_for_sale);

        // 4. Allocate the internal document number
        let number = numbering::sale_number(
            numbering::next_sequence_value(&self.db, "sale_number_seq").await?,
        );

        let sale = domain::Sale {
            id: sale_id,
            number,
            customer_id: CustomerId::from_uuid(input.customer_id),
            status: domain::SaleStatus::Draft,
            is_white: input.is_white,
            sale_date: input.sale_date,
            invoice_type,
            point_of_sale: input.point_of_sale,
            taxed_net: totals.taxed_net,
            untaxed_net: totals.untaxed_net,
            exempt_amount: totals.exempt_amount,
            iva_amount: totals.iva_amount,
            gross_income_perception: input.gross_income_perception,
            total: totals.total,
            invoicing_state: domain::InvoicingState::Uninvoiced,
            invoice_number: None,
            invoice_full_number: None,
            cae: None,
            cae_expiry: None,
            invoicing_note: None,
            items,
        };

        // 5. Insert the sale and its items in one transaction
        let txn = self.db.begin().await?;
        let now = Utc::now();

        sales::ActiveModel {
            id: Set(sale.id.into_inner()),
            number: Set(sale.number.clone()),
            customer_id: Set(input.customer_id),
            status: Set(SaleStatus::Draft),
            is_white: Set(sale.is_white),
            sale_date: Set(sale.sale_date),
            invoice_type: Set(sale.invoice_type.into()),
            point_of_sale: Set(point_of_sale),
            taxed_net: Set(sale.taxed_net),
            untaxed_net: Set(sale.untaxed_net),
            exempt_amount: Set(sale.exempt_amount),
            iva_amount: Set(sale.iva_amount),
            gross_income_perception: Set(sale.gross_income_perception),
            total: Set(sale.total),
            invoicing_state: Set(InvoicingState::Uninvoiced),
            invoice_number: Set(None),
            invoice_full_number: Set(None),
            cae: Set(None),
            cae_expiry: Set(None),
            invoicing_note: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        for item in &sale.items {
            sale_items::ActiveModel {
                id: Set(item.id.into_inner()),
                sale_id: Set(sale.id.into_inner()),
                description: Set(item.description.clone()),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                iva_rate: Set(item.iva_rate.into()),
                net_amount: Set(item.net_amount),
                iva_amount: Set(item.iva_amount),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(sale)
    }

    /// Loads a sale with its line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the sale does not exist or the query fails.
    pub async fn get(&self, sale_id: Uuid) -> Result<domain::Sale, SaleError> {
        let (sale, items) = self
            .load_with_items(sale_id)
            .await?
            .ok_or(SaleError::NotFound(sale_id))?;
        Ok(sale.into_domain(items))
    }

    /// Confirms a draft sale.
    ///
    /// The flip is filtered on the draft status; of two racing
    /// confirmations exactly one succeeds and the other learns the sale
    /// is already confirmed. Posting the account debit is the caller's
    /// next step.
    ///
    /// # Errors
    ///
    /// Returns an error if the sale is missing, already confirmed,
    /// cancelled, or the update fails.
    pub async fn confirm(&self, sale_id: Uuid) -> Result<domain::Sale, SaleError> {
        let updated = sales::Entity::update_many()
            .set(sales::ActiveModel {
                status: Set(SaleStatus::Confirmed),
                ..Default::default()
            })
            .filter(sales::Column::Id.eq(sale_id))
            .filter(sales::Column::Status.eq(SaleStatus::Draft))
            .exec(&self.db)
            .await?;

        if updated.rows_affected == 0 {
            return Err(self.explain_missed_flip(sale_id).await);
        }
        self.get(sale_id).await
    }

    /// Cancels a draft sale.
    ///
    /// Confirmed sales are already posted to the customer's account;
    /// correcting them takes a credit note, not a cancellation.
    ///
    /// # Errors
    ///
    /// Returns an error if the sale is missing, confirmed, already
    /// cancelled, or the update fails.
    pub async fn cancel(&self, sale_id: Uuid) -> Result<domain::Sale, SaleError> {
        let updated = sales::Entity::update_many()
            .set(sales::ActiveModel {
                status: Set(SaleStatus::Cancelled),
                ..Default::default()
            })
            .filter(sales::Column::Id.eq(sale_id))
            .filter(sales::Column::Status.eq(SaleStatus::Draft))
            .exec(&self.db)
            .await?;

        if updated.rows_affected == 0 {
            return Err(self.explain_missed_flip(sale_id).await);
        }
        self.get(sale_id).await
    }

    /// Explains why a conditional status flip matched no row.
    async fn explain_missed_flip(&self, sale_id: Uuid) -> SaleError {
        match sales::Entity::find_by_id(sale_id).one(&self.db).await {
            Ok(None) => SaleError::NotFound(sale_id),
            Ok(Some(sale)) => match sale.status {
                SaleStatus::Confirmed => SaleError::AlreadyConfirmed(sale_id),
                SaleStatus::Cancelled => SaleError::Cancelled(sale_id),
                SaleStatus::Draft => SaleError::Database(DbErr::Custom(format!(
                    "conditional status update missed draft sale {sale_id}"
                ))),
            },
            Err(err) => SaleError::Database(err),
        }
    }

    async fn load_with_items(
        &self,
        sale_id: Uuid,
    ) -> Result<Option<(sales::Model, Vec<sale_items::Model>)>, DbErr> {
        let Some(sale) = sales::Entity::find_by_id(sale_id).one(&self.db).await? else {
            return Ok(None);
        };
        let items = sale_items::Entity::find()
            .filter(sale_items::Column::SaleId.eq(sale_id))
            .order_by_asc(sale_items::Column::Id)
            .all(&self.db)
            .await?;
        Ok(Some((sale, items)))
    }
}

/// Validates and prices raw line items for a new sale.
fn price_items(
    sale_id: SaleId,
    inputs: &[CreateSaleItemInput],
) -> Result<Vec<domain::SaleItem>, SaleError> {
    if inputs.is_empty() {
        return Err(SaleError::NoItems);
    }
    let mut items = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        if input.description.trim().is_empty() {
            return Err(SaleError::InvalidItem {
                index,
                reason: "description is empty".to_string(),
            });
        }
        if input.quantity <= Decimal::ZERO {
            return Err(SaleError::InvalidItem {
                index,
                reason: format!("quantity {} is not positive", input.quantity),
            });
        }
        if input.unit_price < Decimal::ZERO {
            return Err(SaleError::InvalidItem {
                index,
                reason: format!("unit price {} is negative", input.unit_price),
            });
        }
        let (net_amount, iva_amount) =
            domain::SaleItem::line_amounts(input.quantity, input.unit_price, input.iva_rate);
        items.push(domain::SaleItem {
            id: SaleItemId::new(),
            sale_id,
            description: input.description.clone(),
            quantity: input.quantity,
            unit_price: input.unit_price,
            iva_rate: input.iva_rate,
            net_amount,
            iva_amount,
        });
    }
    Ok(items)
}

fn store_err(err: DbErr) -> StoreError {
    StoreError(err.to_string())
}

#[async_trait::async_trait]
impl SaleStore for SaleRepository {
    async fn load_for_invoicing(
        &self,
        sale_id: SaleId,
    ) -> Result<Option<(domain::Sale, domain::Customer)>, StoreError> {
        let Some((sale, items)) = self
            .load_with_items(sale_id.into_inner())
            .await
            .map_err(store_err)?
        else {
            return Ok(None);
        };
        let customer = customers::Entity::find_by_id(sale.customer_id)
            .one(&self.db)
            .await
            .map_err(store_err)?
            .ok_or_else(|| {
                StoreError(format!(
                    "customer {} of sale {sale_id} is missing",
                    sale.customer_id
                ))
            })?;
        Ok(Some((sale.into_domain(items), customer.into())))
    }

    async fn record_authorization(
        &self,
        sale_id: SaleId,
        authorization: &RecordedAuthorization,
    ) -> Result<bool, StoreError> {
        let updated = sales::Entity::update_many()
            .set(sales::ActiveModel {
                invoicing_state: Set(InvoicingState::Invoiced),
                invoice_number: Set(Some(authorization.voucher_number)),
                invoice_full_number: Set(Some(authorization.full_number.clone())),
                cae: Set(Some(authorization.cae.clone())),
                cae_expiry: Set(Some(authorization.cae_expiry)),
                ..Default::default()
            })
            .filter(sales::Column::Id.eq(sale_id.into_inner()))
            .filter(sales::Column::InvoicingState.eq(InvoicingState::Uninvoiced))
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(updated.rows_affected == 1)
    }

    async fn mark_authorized_unrecorded(
        &self,
        sale_id: SaleId,
        authorization: &RecordedAuthorization,
        note: &str,
    ) -> Result<(), StoreError> {
        // Never demote a sale whose authorization did get recorded
        sales::Entity::update_many()
            .set(sales::ActiveModel {
                invoicing_state: Set(InvoicingState::AuthorizedUnrecorded),
                invoice_number: Set(Some(authorization.voucher_number)),
                invoice_full_number: Set(Some(authorization.full_number.clone())),
                cae: Set(Some(authorization.cae.clone())),
                cae_expiry: Set(Some(authorization.cae_expiry)),
                invoicing_note: Set(Some(note.to_string())),
                ..Default::default()
            })
            .filter(sales::Column::Id.eq(sale_id.into_inner()))
            .filter(sales::Column::InvoicingState.ne(InvoicingState::Invoiced))
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}
