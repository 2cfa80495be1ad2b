//! Customer repository for current-account holders.

use bdn_core::sales as domain;
use bdn_shared::types::CustomerId;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::entities::customers;

/// Error types for customer operations.
#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    /// Customer not found.
    #[error("Customer not found: {0}")]
    NotFound(Uuid),

    /// Customer name is blank.
    #[error("Customer name cannot be empty")]
    EmptyName,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerInput {
    /// Display name.
    pub name: String,
    /// CUIT/CUIL/DNI as entered, separators allowed.
    pub tax_id: Option<String>,
    /// Fiscal classification; required before electronic invoicing.
    pub tax_category: Option<domain::TaxCategory>,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Street address.
    pub address: Option<String>,
}

/// Input for updating a customer. `None` fields stay unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomerInput {
    /// Display name.
    pub name: Option<String>,
    /// CUIT/CUIL/DNI (`Some(None)` clears it).
    pub tax_id: Option<Option<String>>,
    /// Fiscal classification (`Some(None)` clears it).
    pub tax_category: Option<Option<domain::TaxCategory>>,
    /// Contact email.
    pub email: Option<Option<String>>,
    /// Contact phone.
    pub phone: Option<Option<String>>,
    /// Street address.
    pub address: Option<Option<String>>,
    /// Active flag; inactive customers take no new documents.
    pub is_active: Option<bool>,
}

/// Customer repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a customer. New customers start active.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the insert fails.
    pub async fn create(
        &self,
        input: CreateCustomerInput,
    ) -> Result<domain::Customer, CustomerError> {
        if input.name.trim().is_empty() {
            return Err(CustomerError::EmptyName);
        }

        let now = Utc::now();
        let customer = customers::ActiveModel {
            id: Set(CustomerId::new().into_inner()),
            name: Set(input.name),
            tax_id: Set(input.tax_id),
            tax_category: Set(input.tax_category.map(Into::into)),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let customer = customer.insert(&self.db).await?;
        Ok(customer.into())
    }

    /// Loads a customer by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer does not exist or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<domain::Customer, CustomerError> {
        let customer = customers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CustomerError::NotFound(id))?;
        Ok(customer.into())
    }

    /// Lists all customers ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self) -> Result<Vec<domain::Customer>, CustomerError> {
        let customers = customers::Entity::find()
            .order_by_asc(customers::Column::Name)
            .all(&self.db)
            .await?;
        Ok(customers.into_iter().map(Into::into).collect())
    }

    /// Updates a customer's data.
    ///
    /// # Errors
    ///
    /// Returns an error if the customer does not exist, a new name is
    /// blank, or the update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCustomerInput,
    ) -> Result<domain::Customer, CustomerError> {
        let customer = customers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CustomerError::NotFound(id))?;

        if let Some(name) = &input.name
            && name.trim().is_empty()
        {
            return Err(CustomerError::EmptyName);
        }

        let mut active: customers::ActiveModel = customer.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(tax_id) = input.tax_id {
            active.tax_id = Set(tax_id);
        }
        if let Some(tax_category) = input.tax_category {
            active.tax_category = Set(tax_category.map(Into::into));
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        let customer = active.update(&self.db).await?;
        Ok(customer.into())
    }
}
