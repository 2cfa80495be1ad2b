//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// ARCA/AFIP electronic invoicing configuration.
    pub afip: AfipConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// ARCA/AFIP electronic invoicing configuration.
///
/// The backend talks to the WSFEv1 web service through an HTTP gateway
/// (the same bridge the desktop client uses), so the only credentials
/// needed here are the issuer CUIT and the gateway token.
#[derive(Debug, Clone, Deserialize)]
pub struct AfipConfig {
    /// Issuer CUIT, digits only (no hyphens).
    pub cuit: String,
    /// Base URL of the WSFEv1 HTTP gateway.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    /// Bearer token for the gateway, if it requires one.
    #[serde(default)]
    pub api_token: Option<String>,
    /// When true, vouchers go to the homologation (testing) environment.
    #[serde(default = "default_homologation")]
    pub homologation: bool,
    /// Request timeout for gateway calls, in seconds.
    #[serde(default = "default_afip_timeout")]
    pub timeout_secs: u64,
}

fn default_gateway_url() -> String {
    "http://localhost:3100".to_string()
}

fn default_homologation() -> bool {
    // Production submission must be opted into explicitly.
    true
}

fn default_afip_timeout() -> u64 {
    60
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BDN").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
