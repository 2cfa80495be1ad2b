//! Credit note routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use bdn_db::repositories::{CreateCreditNoteInput, CreditNoteError};
use bdn_db::{CreditNoteRepository, LedgerRepository};
use bdn_shared::types::business_date_today;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::AppState;

/// Creates the credit note routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/credit-notes", post(issue_credit_note))
}

/// Issue credit note request.
#[derive(Debug, Deserialize)]
pub struct IssueCreditNoteRequest {
    /// Benefiting customer.
    pub customer_id: uuid::Uuid,
    /// Sale being corrected, if the note relates to one.
    pub sale_id: Option<uuid::Uuid>,
    /// Amount credited; must be positive.
    pub amount: Decimal,
    /// Why the note is issued.
    pub reason: String,
    /// Business date; defaults to today on the Buenos Aires calendar.
    pub note_date: Option<NaiveDate>,
    /// Ledger entry this note reverses. When absent and `sale_id` is
    /// set, the sale's original debit entry is linked instead.
    pub reverses_entry_id: Option<uuid::Uuid>,
}

/// POST /credit-notes - Issue a credit note and credit the account.
async fn issue_credit_note(
    State(state): State<AppState>,
    Json(payload): Json<IssueCreditNoteRequest>,
) -> impl IntoResponse {
    let repo = CreditNoteRepository::new((*state.db).clone());

    let reverses_entry_id = payload.reverses_entry_id;
    let note = match repo
        .create(CreateCreditNoteInput {
            customer_id: payload.customer_id,
            sale_id: payload.sale_id,
            amount: payload.amount,
            reason: payload.reason,
            note_date: payload.note_date.unwrap_or_else(business_date_today),
            reverses_entry_id,
        })
        .await
    {
        Ok(note) => note,
        Err(e) => return credit_note_error_response(&e),
    };

    info!(
        credit_note_id = %note.id,
        number = %note.number,
        amount = %note.amount,
        "Credit note issued"
    );

    // The issued note owes its credit to the account.
    let ledger = LedgerRepository::new((*state.db).clone());
    match ledger.post_credit_note_movement(&note, reverses_entry_id).await {
        Ok(posted) => (
            StatusCode::CREATED,
            Json(json!({
                "credit_note": note,
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
                credit_note_id = %note.id,
                error = %e,
                "Credit note issued but its credit could not be posted"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "issued_not_posted",
                    "message": "The credit note was issued but its credit could not be posted to the account",
                    "details": {
                        "credit_note_id": note.id,
                        "ledger_error": e.error_code().to_ascii_lowercase(),
                    },
                })),
            )
                .into_response()
        }
    }
}

/// Maps a credit note repository error onto the response contract.
fn credit_note_error_response(err: &CreditNoteError) -> Response {
    let (status, code) = match err {
        CreditNoteError::CustomerNotFound(_) => (StatusCode::NOT_FOUND, "customer_not_found"),
        CreditNoteError::CustomerInactive(_) => (StatusCode::CONFLICT, "customer_inactive"),
        CreditNoteError::SaleNotFound(_) => (StatusCode::NOT_FOUND, "sale_not_found"),
        CreditNoteError::SaleCustomerMismatch { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "sale_customer_mismatch")
        }
        CreditNoteError::ReversedEntryNotFound(_) => {
            (StatusCode::NOT_FOUND, "reversed_entry_not_found")
        }
        CreditNoteError::ReversedEntryMismatch { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "reversed_entry_mismatch")
        }
        CreditNoteError::NonPositiveAmount(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "non_positive_amount")
        }
        CreditNoteError::EmptyReason => (StatusCode::UNPROCESSABLE_ENTITY, "empty_reason"),
        CreditNoteError::Database(e) => {
            error!(error = %e, "Credit note operation failed");
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
