//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for customers and their current accounts
//! - Sale, payment and credit-note registration endpoints
//! - Electronic invoicing endpoints backed by the AFIP gateway

pub mod routes;

use axum::Router;
use bdn_core::afip::AfipHttpClient;
use bdn_core::invoicing::InvoicingService;
use bdn_db::SaleRepository;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Invoicing workflow over the sale store and the AFIP gateway.
    pub invoicing: Arc<InvoicingService<SaleRepository, AfipHttpClient>>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
