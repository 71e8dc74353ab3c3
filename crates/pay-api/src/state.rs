//! # Application State
//!
//! Shared state for the Axum application: the adapter, the quote store
//! and service configuration.

use pay_amazon::{AmazonPayAdapter, AmazonPayConfig, HttpClientFactory, RecordingGatewayClient};
use pay_core::{BaseUrlBuilder, ClientFactory, InMemoryQuoteRepository, StoreRegistry};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Storefront base URL, used for sign-in return URLs
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Store used when a request names none
    pub default_store_id: String,
    /// Explicit path to the store credentials file
    pub stores_config: Option<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            default_store_id: std::env::var("DEFAULT_STORE_ID")
                .unwrap_or_else(|_| "default".to_string()),
            stores_config: std::env::var("STORES_CONFIG").ok(),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_url: "http://localhost:8080".to_string(),
            environment: "development".to_string(),
            default_store_id: "default".to_string(),
            stores_config: None,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Gateway adapter
    pub adapter: AmazonPayAdapter,
    /// Quotes known to the service
    pub quotes: Arc<InMemoryQuoteRepository>,
    /// Application config
    pub config: AppConfig,
    /// True when no store credentials were found and calls are recorded in-process
    pub offline: bool,
}

impl AppState {
    /// Build state from the environment and the store credentials file
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let amazon_config = AmazonPayConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load Amazon Pay config: {}", e))?;

        let (clients, offline): (Arc<dyn ClientFactory>, bool) = match load_store_registry(&config)? {
            Some(registry) => {
                let factory = HttpClientFactory::new(registry)
                    .map_err(|e| anyhow::anyhow!("Failed to initialize gateway clients: {}", e))?;
                (Arc::new(factory) as Arc<dyn ClientFactory>, false)
            }
            None if config.is_production() => {
                anyhow::bail!("No store credentials found; refusing to start in production");
            }
            None => {
                tracing::warn!("No store credentials found, gateway calls are recorded offline");
                (Arc::new(RecordingGatewayClient::new()) as Arc<dyn ClientFactory>, true)
            }
        };

        let quotes = Arc::new(InMemoryQuoteRepository::new());
        let adapter = AmazonPayAdapter::new(
            clients,
            amazon_config,
            quotes.clone(),
            Arc::new(BaseUrlBuilder::new(&config.base_url)),
        );

        Ok(Self {
            adapter,
            quotes,
            config,
            offline,
        })
    }

    /// Assemble state from existing parts (tests, embedding)
    pub fn from_parts(
        adapter: AmazonPayAdapter,
        quotes: Arc<InMemoryQuoteRepository>,
        config: AppConfig,
    ) -> Self {
        Self {
            adapter,
            quotes,
            config,
            offline: false,
        }
    }

    /// Requested store or the configured default
    pub fn store_id<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(self.config.default_store_id.as_str())
    }
}

/// Load store credentials from config
fn load_store_registry(config: &AppConfig) -> anyhow::Result<Option<StoreRegistry>> {
    if let Some(path) = &config.stores_config {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
        return parse_registry(path, &content).map(Some);
    }

    let config_paths = [
        "config/stores.toml",
        "../config/stores.toml",
        "../../config/stores.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            return parse_registry(path, &content).map(Some);
        }
    }

    Ok(None)
}

fn parse_registry(path: &str, content: &str) -> anyhow::Result<StoreRegistry> {
    let registry = StoreRegistry::from_toml_str(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
    tracing::info!("Loaded {} stores from {}", registry.len(), path);
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            ..AppConfig::default()
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_invalid_socket_addr() {
        let config = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_parse_registry() {
        let registry = parse_registry(
            "inline",
            r#"
            [[stores]]
            id = "default"
            public_key_id = "PUB"
            private_key = "secret"
            "#,
        )
        .unwrap();
        assert!(registry.has_store("default"));
        assert!(parse_registry("inline", "stores = 3").is_err());
    }
}
