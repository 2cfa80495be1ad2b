//! Authority parameter and health routes.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde_json::json;

use crate::AppState;

use super::invoicing_error_response;

/// Creates the authority passthrough routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/afip/voucher-types", get(voucher_types))
        .route("/afip/server-status", get(server_status))
}

/// GET /afip/voucher-types - Voucher types the authority accepts.
async fn voucher_types(State(state): State<AppState>) -> impl IntoResponse {
    match state.invoicing.voucher_types().await {
        Ok(types) => (StatusCode::OK, Json(json!({ "voucher_types": types }))).into_response(),
        Err(err) => invoicing_error_response(&err),
    }
}

/// GET /afip/server-status - Health of the authority's backend services.
async fn server_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.invoicing.server_status().await {
        Ok(status) => (
            StatusCode::OK,
            Json(json!({
                "app_server": status.app_server,
                "db_server": status.db_server,
                "auth_server": status.auth_server,
                "is_ok": status.is_ok(),
            })),
        )
            .into_response(),
        Err(err) => invoicing_error_response(&err),
    }
}
