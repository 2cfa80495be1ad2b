//! Customer registry and current-account routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use bdn_core::ledger::{Direction, MovementInput};
use bdn_core::sales::{Customer, TaxCategory};
use bdn_db::repositories::{CreateCustomerInput, CustomerError, UpdateCustomerInput};
use bdn_db::{CustomerRepository, LedgerRepository};
use bdn_shared::types::business_date_today;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::ledger_error_response;
use crate::AppState;

/// Default statement window when the caller does not ask for one.
const DEFAULT_STATEMENT_LIMIT: u64 = 50;
/// Hard ceiling on the statement window.
const MAX_STATEMENT_LIMIT: u64 = 200;

/// Creates the customer and account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", post(create_customer))
        .route("/customers", get(list_customers))
        .route("/customers/{customer_id}", get(get_customer))
        .route("/customers/{customer_id}", patch(update_customer))
        .route("/customers/{customer_id}/account", get(account_statement))
        .route(
            "/customers/{customer_id}/account/balance",
            get(account_balance),
        )
        .route(
            "/customers/{customer_id}/account/movements",
            post(post_manual_movement),
        )
        .route(
            "/customers/{customer_id}/account/recompute",
            post(recompute_account),
        )
}

/// Create customer request.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    /// Display name.
    pub name: String,
    /// CUIT/CUIL/DNI (optional).
    pub tax_id: Option<String>,
    /// Fiscal classification (optional).
    pub tax_category: Option<TaxCategory>,
    /// Contact email (optional).
    pub email: Option<String>,
    /// Contact phone (optional).
    pub phone: Option<String>,
    /// Street address (optional).
    pub address: Option<String>,
}

/// Update customer request. Absent fields stay unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    /// New display name (optional).
    pub name: Option<String>,
    /// New tax identifier (optional).
    pub tax_id: Option<Option<String>>,
    /// New fiscal classification (optional).
    pub tax_category: Option<Option<TaxCategory>>,
    /// New contact email (optional).
    pub email: Option<Option<String>>,
    /// New contact phone (optional).
    pub phone: Option<Option<String>>,
    /// New street address (optional).
    pub address: Option<Option<String>>,
    /// New active flag (optional).
    pub is_active: Option<bool>,
}

/// Manual account adjustment request.
#[derive(Debug, Deserialize)]
pub struct PostMovementRequest {
    /// Whether the adjustment increases or decreases the debt.
    pub direction: Direction,
    /// Human-readable description of the adjustment.
    pub concept: String,
    /// Positive monetary magnitude.
    pub amount: Decimal,
    /// Business date; defaults to today on the Buenos Aires calendar.
    pub occurred_at: Option<NaiveDate>,
    /// Optional external document reference.
    pub reference: Option<String>,
}

/// Statement window query parameters.
#[derive(Debug, Deserialize)]
pub struct StatementQuery {
    /// Maximum number of entries to return.
    pub limit: Option<u64>,
}

/// POST /customers - Register a new customer.
async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());

    let customer = match repo
        .create(CreateCustomerInput {
            name: payload.name,
            tax_id: payload.tax_id,
            tax_category: payload.tax_category,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
        })
        .await
    {
        Ok(c) => c,
        Err(CustomerError::EmptyName) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "empty_name",
                    "message": "Customer name cannot be empty"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to create customer");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred creating the customer"
                })),
            )
                .into_response();
        }
    };

    info!(customer_id = %customer.id, name = %customer.name, "Customer created");

    (StatusCode::CREATED, Json(customer_json(&customer))).into_response()
}

/// GET /customers - List all customers.
async fn list_customers(State(state): State<AppState>) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());

    let customers = match repo.list().await {
        Ok(list) => list,
        Err(e) => {
            error!(error = %e, "Failed to list customers");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response();
        }
    };

    let customers_json: Vec<_> = customers.iter().map(customer_json).collect();

    (StatusCode::OK, Json(json!({ "customers": customers_json }))).into_response()
}

/// GET `/customers/{customer_id}` - Get one customer.
async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());

    match repo.get(customer_id).await {
        Ok(customer) => (StatusCode::OK, Json(customer_json(&customer))).into_response(),
        Err(CustomerError::NotFound(_)) => customer_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to fetch customer");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// PATCH `/customers/{customer_id}` - Update customer data.
async fn update_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> impl IntoResponse {
    let repo = CustomerRepository::new((*state.db).clone());

    let customer = match repo
        .update(
            customer_id,
            UpdateCustomerInput {
                name: payload.name,
                tax_id: payload.tax_id,
                tax_category: payload.tax_category,
                email: payload.email,
                phone: payload.phone,
                address: payload.address,
                is_active: payload.is_active,
            },
        )
        .await
    {
        Ok(c) => c,
        Err(CustomerError::NotFound(_)) => return customer_not_found(),
        Err(CustomerError::EmptyName) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "empty_name",
                    "message": "Customer name cannot be empty"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to update customer");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred updating the customer"
                })),
            )
                .into_response();
        }
    };

    info!(customer_id = %customer_id, "Customer updated");

    (StatusCode::OK, Json(customer_json(&customer))).into_response()
}

/// GET `/customers/{customer_id}/account` - Account statement, newest
/// first.
async fn account_statement(
    State(state): State<AppState>,
    Path(customer_id): Path<uuid::Uuid>,
    Query(query): Query<StatementQuery>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.statement(customer_id, statement_limit(query.limit)).await {
        Ok(statement) => (
            StatusCode::OK,
            Json(json!({
                "customer_id": statement.customer_id,
                "balance": statement.balance,
                "is_in_debt": statement.is_in_debt(),
                "is_in_credit": statement.is_in_credit(),
                "entries": statement.entries,
            })),
        )
            .into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/customers/{customer_id}/account/balance` - Current balance
/// only.
async fn account_balance(
    State(state): State<AppState>,
    Path(customer_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.current_balance(customer_id).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(json!({
                "customer_id": customer_id,
                "balance": balance,
                "is_in_debt": balance > Decimal::ZERO,
                "is_in_credit": balance < Decimal::ZERO,
            })),
        )
            .into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/customers/{customer_id}/account/movements` - Post a manual
/// adjustment to the account.
async fn post_manual_movement(
    State(state): State<AppState>,
    Path(customer_id): Path<uuid::Uuid>,
    Json(payload): Json<PostMovementRequest>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    let mut input = MovementInput::new(
        customer_id,
        payload.direction,
        payload.concept,
        payload.amount,
        payload.occurred_at.unwrap_or_else(business_date_today),
    );
    input.reference = payload.reference;

    match repo.post_movement(input).await {
        Ok(posted) => {
            info!(
                customer_id = %customer_id,
                seq = posted.entry.seq,
                direction = posted.entry.direction.as_str(),
                amount = %posted.entry.amount,
                "Manual movement posted"
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "entry": posted.entry,
                    "previous_balance": posted.previous_balance,
                    "new_balance": posted.new_balance,
                })),
            )
                .into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/customers/{customer_id}/account/recompute` - Replay the
/// account and repair diverged running balances.
async fn recompute_account(
    State(state): State<AppState>,
    Path(customer_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.recompute_balances(customer_id).await {
        Ok(rewritten) => {
            if rewritten > 0 {
                info!(customer_id = %customer_id, rewritten, "Account balances repaired");
            }
            (
                StatusCode::OK,
                Json(json!({
                    "customer_id": customer_id,
                    "rewritten": rewritten,
                    "consistent": rewritten == 0,
                })),
            )
                .into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// Serializes a customer for API responses.
fn customer_json(customer: &Customer) -> serde_json::Value {
    json!({
        "id": customer.id,
        "name": customer.name,
        "tax_id": customer.tax_id,
        "tax_category": customer.tax_category,
        "email": customer.email,
        "phone": customer.phone,
        "address": customer.address,
        "is_active": customer.is_active,
    })
}

fn customer_not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "Customer not found"
        })),
    )
        .into_response()
}

/// Clamps the requested statement window to the allowed range.
fn statement_limit(requested: Option<u64>) -> u64 {
    requested.map_or(DEFAULT_STATEMENT_LIMIT, |limit| {
        limit.clamp(1, MAX_STATEMENT_LIMIT)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_limit_defaults_and_clamps() {
        assert_eq!(statement_limit(None), 50);
        assert_eq!(statement_limit(Some(10)), 10);
        assert_eq!(statement_limit(Some(0)), 1);
        assert_eq!(statement_limit(Some(200)), 200);
        assert_eq!(statement_limit(Some(5000)), 200);
    }

    #[test]
    fn test_update_request_reads_only_present_fields() {
        let payload: UpdateCustomerRequest =
            serde_json::from_str(r#"{"name": "BDN SRL", "tax_category": "monotax"}"#).unwrap();
        assert_eq!(payload.name.as_deref(), Some("BDN SRL"));
        assert_eq!(payload.tax_category, Some(Some(TaxCategory::Monotax)));
        assert!(payload.tax_id.is_none());
        assert!(payload.is_active.is_none());
    }
}
