//! Sale lifecycle and electronic invoicing routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bdn_core::sales::{IvaRate, Sale};
use bdn_db::repositories::{CreateSaleInput, CreateSaleItemInput, SaleError};
use bdn_db::{LedgerRepository, SaleRepository};
use bdn_shared::types::{SaleId, business_date_today};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::AppState;

use super::{invoicing_error_parts, invoicing_error_response};

/// Creates the sale routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", post(create_sale))
        .route("/sales/{sale_id}", get(get_sale))
        .route("/sales/{sale_id}/confirm", post(confirm_sale))
        .route("/sales/{sale_id}/cancel", post(cancel_sale))
        .route("/sales/{sale_id}/invoice", post(generate_invoice))
        .route("/sales/{sale_id}/invoice/status", get(invoice_status))
}

/// Create sale request.
#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    /// Buying customer.
    pub customer_id: uuid::Uuid,
    /// Business date; defaults to today on the Buenos Aires calendar.
    pub sale_date: Option<NaiveDate>,
    /// Declared ("white") sale, eligible for electronic invoicing.
    #[serde(default)]
    pub is_white: bool,
    /// Issuing point-of-sale code; defaults to 1.
    #[serde(default = "default_point_of_sale")]
    pub point_of_sale: u32,
    /// Gross-income perception on top of the line items; defaults to 0.
    pub gross_income_perception: Option<Decimal>,
    /// Line items; at least one.
    pub items: Vec<CreateSaleItemRequest>,
}

/// One line of a sale being created.
#[derive(Debug, Deserialize)]
pub struct CreateSaleItemRequest {
    /// Free-text description of the product sold.
    pub description: String,
    /// Units sold; must be positive.
    pub quantity: Decimal,
    /// Net unit price; must not be negative.
    pub unit_price: Decimal,
    /// IVA rate category for the line.
    pub iva_rate: IvaRate,
}

/// Confirm sale request. The body is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmSaleRequest {
    /// Submit the sale for electronic invoicing right after posting,
    /// when it is a declared sale.
    #[serde(default)]
    pub auto_invoice: bool,
}

const fn default_point_of_sale() -> u32 {
    1
}

/// POST /sales - Draft a new sale.
async fn create_sale(
    State(state): State<AppState>,
    Json(payload): Json<CreateSaleRequest>,
) -> impl IntoResponse {
    let repo = SaleRepository::new((*state.db).clone());

    let input = CreateSaleInput {
        customer_id: payload.customer_id,
        sale_date: payload.sale_date.unwrap_or_else(business_date_today),
        is_white: payload.is_white,
        point_of_sale: payload.point_of_sale,
        gross_income_perception: payload.gross_income_perception.unwrap_or(Decimal::ZERO),
        items: payload
            .items
            .into_iter()
            .map(|item| CreateSaleItemInput {
                description: item.description,
                quantity: item.quantity,
                unit_price: item.unit_price,
                iva_rate: item.iva_rate,
            })
            .collect(),
    };

    match repo.create(input).await {
        Ok(sale) => {
            info!(
                sale_id = %sale.id,
                number = %sale.number,
                total = %sale.total,
                "Sale drafted"
            );
            (StatusCode::CREATED, Json(sale_json(&sale))).into_response()
        }
        Err(e) => sale_error_response(&e),
    }
}

/// GET `/sales/{sale_id}` - Get a sale with its line items.
async fn get_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = SaleRepository::new((*state.db).clone());

    match repo.get(sale_id).await {
        Ok(sale) => (StatusCode::OK, Json(sale_json(&sale))).into_response(),
        Err(e) => sale_error_response(&e),
    }
}

/// POST `/sales/{sale_id}/confirm` - Confirm a draft sale and post its
/// debit to the customer's account.
async fn confirm_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<uuid::Uuid>,
    payload: Option<Json<ConfirmSaleRequest>>,
) -> impl IntoResponse {
    let auto_invoice = payload.is_some_and(|Json(p)| p.auto_invoice);
    let repo = SaleRepository::new((*state.db).clone());

    // Confirmation is one-shot; racing confirmations resolve to a
    // single winner inside the repository.
    let mut sale = match repo.confirm(sale_id).await {
        Ok(s) => s,
        Err(e) => return sale_error_response(&e),
    };

    info!(sale_id = %sale_id, number = %sale.number, "Sale confirmed");

    // The confirmed sale owes its debit to the account.
    let ledger = LedgerRepository::new((*state.db).clone());
    let posted = match ledger.post_sale_movement(&sale).await {
        Ok(p) => p,
        Err(e) => {
            error!(
                sale_id = %sale_id,
                error = %e,
                "Sale confirmed but its debit could not be posted"
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "confirmed_not_posted",
                    "message": "The sale was confirmed but its debit could not be posted to the account",
                    "details": {
                        "sale_id": sale.id,
                        "ledger_error": e.error_code().to_ascii_lowercase(),
                    },
                })),
            )
                .into_response();
        }
    };

    let posted_json = posted.map(|p| {
        json!({
            "entry": p.entry,
            "previous_balance": p.previous_balance,
            "new_balance": p.new_balance,
        })
    });

    // Optionally submit for invoicing in the same call. A failure here
    // does not undo the confirmation; it is reported alongside it.
    let mut invoice = serde_json::Value::Null;
    let mut invoice_error = None;
    if auto_invoice && sale.is_white {
        match state.invoicing.generate_invoice(SaleId::from_uuid(sale_id)).await {
            Ok(issued) => {
                info!(
                    sale_id = %sale_id,
                    full_number = %issued.full_number,
                    cae = %issued.cae,
                    "Invoice issued on confirmation"
                );
                invoice = json!(issued);
                if let Ok(fresh) = repo.get(sale_id).await {
                    sale = fresh;
                }
            }
            Err(err) => {
                let (_, body) = invoicing_error_parts(&err);
                invoice_error = Some(body);
            }
        }
    }

    let body = match invoice_error {
        Some(err_body) => json!({
            "sale": sale_json(&sale),
            "posted": posted_json,
            "invoice": invoice,
            "invoice_error": err_body,
        }),
        None => json!({
            "sale": sale_json(&sale),
            "posted": posted_json,
            "invoice": invoice,
        }),
    };

    (StatusCode::OK, Json(body)).into_response()
}

/// POST `/sales/{sale_id}/cancel` - Cancel a draft sale.
async fn cancel_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = SaleRepository::new((*state.db).clone());

    match repo.cancel(sale_id).await {
        Ok(sale) => {
            info!(sale_id = %sale_id, "Sale cancelled");
            (StatusCode::OK, Json(sale_json(&sale))).into_response()
        }
        Err(e) => sale_error_response(&e),
    }
}

/// POST `/sales/{sale_id}/invoice` - Generate the electronic invoice.
async fn generate_invoice(
    State(state): State<AppState>,
    Path(sale_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    match state
        .invoicing
        .generate_invoice(SaleId::from_uuid(sale_id))
        .await
    {
        Ok(invoice) => {
            info!(
                sale_id = %sale_id,
                full_number = %invoice.full_number,
                cae = %invoice.cae,
                "Invoice issued"
            );
            (StatusCode::CREATED, Json(invoice)).into_response()
        }
        Err(err) => invoicing_error_response(&err),
    }
}

/// GET `/sales/{sale_id}/invoice/status` - Local and authority-side
/// invoicing state.
async fn invoice_status(
    State(state): State<AppState>,
    Path(sale_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    match state
        .invoicing
        .invoice_status(SaleId::from_uuid(sale_id))
        .await
    {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "sale_id": report.sale_id,
                "state": report.state,
                "recorded": report.recorded.map(|r| json!({
                    "voucher_number": r.voucher_number,
                    "full_number": r.full_number,
                    "cae": r.cae,
                    "cae_expiry": r.cae_expiry,
                })),
                "authority": report.authority.map(|info| json!({
                    "voucher_number": info.voucher_number,
                    "cae": info.cae,
                    "cae_expiry": info.cae_expiry,
                    "voucher_date": info.voucher_date,
                    "total": info.total,
                })),
                "matches": report.matches,
            })),
        )
            .into_response(),
        Err(err) => invoicing_error_response(&err),
    }
}

/// Serializes a sale for API responses.
fn sale_json(sale: &Sale) -> serde_json::Value {
    json!({
        "id": sale.id,
        "number": sale.number,
        "customer_id": sale.customer_id,
        "status": sale.status,
        "is_white": sale.is_white,
        "sale_date": sale.sale_date,
        "invoice_type": sale.invoice_type,
        "point_of_sale": sale.point_of_sale,
        "taxed_net": sale.taxed_net,
        "untaxed_net": sale.untaxed_net,
        "exempt_amount": sale.exempt_amount,
        "iva_amount": sale.iva_amount,
        "gross_income_perception": sale.gross_income_perception,
        "total": sale.total,
        "invoicing_state": sale.invoicing_state,
        "invoice_number": sale.invoice_number,
        "invoice_full_number": sale.invoice_full_number,
        "cae": sale.cae,
        "cae_expiry": sale.cae_expiry,
        "invoicing_note": sale.invoicing_note,
        "items": sale.items,
    })
}

/// Maps a sale repository error onto the response contract.
fn sale_error_response(err: &SaleError) -> Response {
    let (status, code) = match err {
        SaleError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        SaleError::CustomerNotFound(_) => (StatusCode::NOT_FOUND, "customer_not_found"),
        SaleError::CustomerInactive(_) => (StatusCode::CONFLICT, "customer_inactive"),
        SaleError::NoItems => (StatusCode::UNPROCESSABLE_ENTITY, "no_items"),
        SaleError::InvalidItem { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_item"),
        SaleError::NegativePerception(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "negative_perception")
        }
        SaleError::PointOfSaleOutOfRange(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "point_of_sale_out_of_range")
        }
        SaleError::AlreadyConfirmed(_) => (StatusCode::CONFLICT, "already_confirmed"),
        SaleError::Cancelled(_) => (StatusCode::CONFLICT, "sale_cancelled"),
        SaleError::Database(e) => {
            error!(error = %e, "Sale operation failed");
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

    (
        status,
        Json(json!({
            "error": code,
            "message": err.to_string(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_errors_separate_validation_from_conflicts() {
        let response = sale_error_response(&SaleError::NoItems);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = sale_error_response(&SaleError::AlreadyConfirmed(uuid::Uuid::nil()));
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = sale_error_response(&SaleError::NotFound(uuid::Uuid::nil()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn confirm_request_defaults_to_no_auto_invoice() {
        let payload: ConfirmSaleRequest = serde_json::from_value(json!({})).unwrap();
        assert!(!payload.auto_invoice);

        let payload: ConfirmSaleRequest =
            serde_json::from_value(json!({"auto_invoice": true})).unwrap();
        assert!(payload.auto_invoice);
    }
}
