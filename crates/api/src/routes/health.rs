//! Health check endpoints.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check handler.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use bdn_core::afip::AfipHttpClient;
    use bdn_core::invoicing::InvoicingService;
    use bdn_db::SaleRepository;
    use bdn_shared::config::AfipConfig;
    use http_body_util::BodyExt;
    use sea_orm::DatabaseConnection;
    use tower::ServiceExt;

    use super::*;

    /// State with a disconnected pool; enough for routes that never
    /// touch the database.
    fn test_state() -> AppState {
        let afip = AfipHttpClient::from_config(&AfipConfig {
            cuit: "30712345678".to_string(),
            gateway_url: "http://localhost:3100".to_string(),
            api_token: None,
            homologation: true,
            timeout_secs: 5,
        })
        .expect("client should build");

        AppState {
            db: Arc::new(DatabaseConnection::default()),
            invoicing: Arc::new(InvoicingService::new(
                SaleRepository::new(DatabaseConnection::default()),
                afip,
            )),
        }
    }

    #[tokio::test]
    async fn health_answers_without_a_database() {
        let app = routes().with_state(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }
}
