//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bdn_core::afip::AfipError;
use bdn_core::invoicing::InvoicingError;
use bdn_core::ledger::LedgerError;
use serde_json::json;
use tracing::error;

use crate::AppState;

pub mod afip;
pub mod credit_notes;
pub mod customers;
pub mod health;
pub mod payments;
pub mod sales;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(customers::routes())
        .merge(sales::routes())
        .merge(payments::routes())
        .merge(credit_notes::routes())
        .merge(afip::routes())
}

/// Maps a ledger error onto the response contract.
///
/// The status comes from the error class; server-side failures are
/// logged and answered with a generic message.
pub(crate) fn ledger_error_response(err: &LedgerError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = if status.is_server_error() {
        error!(error = %err, "Ledger operation failed");
        "An error occurred".to_string()
    } else {
        err.to_string()
    };

    (
        status,
        Json(json!({
            "error": err.error_code().to_ascii_lowercase(),
            "message": message,
        })),
    )
        .into_response()
}

/// Splits an invoicing error into status and body.
///
/// Split out from [`invoicing_error_response`] so the sale confirmation
/// handler can embed the body of an auto-invoice failure without
/// failing the whole request.
pub(crate) fn invoicing_error_parts(err: &InvoicingError) -> (StatusCode, serde_json::Value) {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let code = err.error_code().to_ascii_lowercase();

    if let InvoicingError::AuthorizedButUnrecorded {
        sale_id,
        full_number,
        cae,
        detail,
        ..
    } = err
    {
        error!(
            sale_id = %sale_id,
            full_number = %full_number,
            cae = %cae,
            detail = %detail,
            "CAE granted but not recorded; manual reconciliation required"
        );
    }

    let details = match err {
        InvoicingError::Validation(violations) => Some(json!(
            violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        )),
        InvoicingError::AlreadyInvoiced {
            full_number, cae, ..
        } => Some(json!({ "full_number": full_number, "cae": cae })),
        InvoicingError::Afip(AfipError::Rejected { observations, .. })
            if !observations.is_empty() =>
        {
            Some(json!(observations))
        }
        InvoicingError::AuthorizedButUnrecorded {
            voucher_number,
            full_number,
            cae,
            cae_expiry,
            ..
        } => Some(json!({
            "voucher_number": voucher_number,
            "full_number": full_number,
            "cae": cae,
            "cae_expiry": cae_expiry,
        })),
        _ => None,
    };

    let body = match details {
        Some(details) => json!({
            "error": code,
            "message": err.to_string(),
            "details": details,
        }),
        None => json!({
            "error": code,
            "message": err.to_string(),
        }),
    };

    (status, body)
}

/// Maps an invoicing error onto the response contract.
pub(crate) fn invoicing_error_response(err: &InvoicingError) -> Response {
    let (status, body) = invoicing_error_parts(err);
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use bdn_core::afip::FiscalValidationError;
    use bdn_shared::types::SaleId;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;

    #[rstest]
    #[case(LedgerError::ZeroAmount, StatusCode::UNPROCESSABLE_ENTITY)]
    #[case(LedgerError::CustomerNotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(LedgerError::ConcurrentPosting, StatusCode::CONFLICT)]
    #[case(LedgerError::Database("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn ledger_responses_follow_the_error_class(
        #[case] err: LedgerError,
        #[case] expected: StatusCode,
    ) {
        let response = ledger_error_response(&err);
        assert_eq!(response.status(), expected);
    }

    #[test]
    fn invoicing_error_bodies_use_lowercase_codes() {
        let (status, body) = invoicing_error_parts(&InvoicingError::SaleNotFound(SaleId::new()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "sale_not_found");

        let (status, body) = invoicing_error_parts(&InvoicingError::NotConfirmed(SaleId::new()));
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "sale_not_confirmed");
    }

    #[test]
    fn validation_failures_list_every_violation() {
        let err = InvoicingError::Validation(vec![
            FiscalValidationError::MissingTaxCategory,
            FiscalValidationError::NonPositiveTotal(dec!(0)),
        ]);

        let (status, body) = invoicing_error_parts(&err);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "fiscal_validation_failed");
        assert_eq!(body["details"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn conflict_body_carries_the_existing_authorization() {
        let err = InvoicingError::AlreadyInvoiced {
            sale_id: SaleId::new(),
            full_number: "A 0003-00000042".to_string(),
            cae: "74123456789012".to_string(),
        };

        let (status, body) = invoicing_error_parts(&err);
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["details"]["full_number"], "A 0003-00000042");
        assert_eq!(body["details"]["cae"], "74123456789012");
    }

    #[test]
    fn divergence_body_carries_the_authorization() {
        let err = InvoicingError::AuthorizedButUnrecorded {
            sale_id: SaleId::new(),
            voucher_number: 42,
            full_number: "B 0001-00000042".to_string(),
            cae: "75123456789012".to_string(),
            cae_expiry: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            detail: "connection reset during update".to_string(),
        };

        let (status, body) = invoicing_error_parts(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "authorized_not_recorded");
        assert_eq!(body["details"]["voucher_number"], 42);
        assert_eq!(body["details"]["cae"], "75123456789012");
    }
}
