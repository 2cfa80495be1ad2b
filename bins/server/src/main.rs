//! BDN API Server
//!
//! Main entry point for the BDN Importacion backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bdn_api::{AppState, create_router};
use bdn_core::afip::AfipHttpClient;
use bdn_core::invoicing::InvoicingService;
use bdn_db::{SaleRepository, connect};
use bdn_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bdn=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Build the gateway client and the invoicing service over it
    let afip = AfipHttpClient::from_config(&config.afip)?;
    info!(
        gateway_url = %config.afip.gateway_url,
        homologation = config.afip.homologation,
        "AFIP gateway client configured"
    );

    let db = Arc::new(db);
    let invoicing = InvoicingService::new(SaleRepository::new((*db).clone()), afip);

    // Create application state
    let state = AppState {
        db,
        invoicing: Arc::new(invoicing),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
