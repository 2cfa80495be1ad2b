//! Payment registration routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use bdn_core::sales::PaymentMethod;
use bdn_db::repositories::{CreatePaymentInput, PaymentError};
use bdn_db::{LedgerRepository, PaymentRepository};
use bdn_shared::types::business_date_today;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::AppState;

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/payments", post(register_payment))
}

/// Register payment request.
#[derive(Debug, Deserialize)]
pub struct RegisterPaymentRequest {
    /// Paying customer.
    pub customer_id: uuid::Uuid,
    /// Amount received; must be positive.
    pub amount: Decimal,
    /// How the payment was received.
    pub method: PaymentMethod,
    /// Business date; defaults to today on the Buenos Aires calendar.
    pub payment_date: Option<NaiveDate>,
    /// External reference (transfer id, check number).
    pub reference: Option<String>,
}

/// POST /payments - Register a payment and credit the account.
async fn register_payment(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPaymentRequest>,
) -> impl IntoResponse {
    let repo = PaymentRepository::new((*state.db).clone());

    let payment = match repo
        .create(CreatePaymentInput {
            customer_id: payload.customer_id,
            amount: payload.amount,
            method: payload.method,
            payment_date: payload.payment_date.unwrap_or_else(business_date_today),
            reference: payload.reference,
        })
        .await
    {
        Ok(payment) => payment,
        Err(e) => return payment_error_response(&e),
    };

    info!(
        payment_id = %payment.id,
        number = %payment.number,
        amount = %payment.amount,
        "Payment registered"
    );

    // The registered payment owes its credit to the account.
    let ledger = LedgerRepository::new((*state.db).clone());
    match ledger.post_payment_movement(&payment).await {
        Ok(posted) => (
            StatusCode::CREATED,
            Json(json!({
                "payment": payment,
                "posted": {
                    "entry": posted.entry,
                    "previous_balance": posted.previous_balance,
                    "new_balance": posted.new_balance,
                },
            })),
        )
            .into_response(),
        Err(e) => {
            error!(
                payment_id = %payment.id,
                error = %e,
                "Payment registered but its credit could not be posted"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "registered_not_posted",
                    "message": "The payment was registered but its credit could not be posted to the account",
                    "details": {
                        "payment_id": payment.id,
                        "ledger_error": e.error_code().to_ascii_lowercase(),
                    },
                })),
            )
                .into_response()
        }
    }
}

/// Maps a payment repository error onto the response contract.
fn payment_error_response(err: &PaymentError) -> Response {
    let (status, code) = match err {
        PaymentError::CustomerNotFound(_) => (StatusCode::NOT_FOUND, "customer_not_found"),
        PaymentError::CustomerInactive(_) => (StatusCode::CONFLICT, "customer_inactive"),
        PaymentError::NonPositiveAmount(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "non_positive_amount")
        }
        PaymentError::Database(e) => {
            error!(error = %e, "Payment operation failed");
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
