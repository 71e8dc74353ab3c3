//! # Store Configuration
//!
//! Per-store gateway credentials. Each store (merchant storefront) talks to
//! the gateway with its own key pair, region and environment.
//! Stores are loaded from `config/stores.toml`.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};

/// Gateway region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// North America
    Na,
    /// Europe / UK
    Eu,
    /// Japan
    Jp,
}

impl Region {
    /// Value of the `x-amz-pay-region` header
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Na => "na",
            Region::Eu => "eu",
            Region::Jp => "jp",
        }
    }

    /// API host for this region
    pub fn api_host(&self) -> &'static str {
        match self {
            Region::Na => "pay-api.amazon.com",
            Region::Eu => "pay-api.amazon.eu",
            Region::Jp => "pay-api.amazon.jp",
        }
    }
}

impl Default for Region {
    fn default() -> Self {
        Region::Na
    }
}

/// Credentials and endpoint settings for a single store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    /// Store identifier (e.g., "default", "jp-store")
    pub id: String,

    /// Public key id registered with the gateway
    pub public_key_id: String,

    /// Signing secret for this store
    #[serde(skip_serializing)]
    pub private_key: String,

    /// Gateway region
    #[serde(default)]
    pub region: Region,

    /// Use the sandbox environment
    #[serde(default = "default_true")]
    pub sandbox: bool,

    /// Override the API base URL (testing)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Whether this store is active
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Store {
    /// Create a sandbox store in the NA region
    pub fn new(
        id: impl Into<String>,
        public_key_id: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            public_key_id: public_key_id.into(),
            private_key: private_key.into(),
            region: Region::Na,
            sandbox: true,
            api_base_url: None,
            active: true,
        }
    }

    /// Builder: set region
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Builder: switch to the live environment
    pub fn live(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Builder: set a custom API base URL
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Base URL requests are sent to, without trailing slash
    pub fn base_url(&self) -> String {
        match &self.api_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}/{}",
                self.region.api_host(),
                if self.sandbox { "sandbox" } else { "live" }
            ),
        }
    }
}

/// Registry of all configured stores
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreRegistry {
    /// Stores from config
    #[serde(default)]
    pub stores: Vec<Store>,

    /// Default store ID (used when no store_id is specified)
    #[serde(default)]
    default_store_id: Option<String>,
}

impl StoreRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with a default store
    pub fn with_default(default_store_id: impl Into<String>) -> Self {
        Self {
            stores: Vec::new(),
            default_store_id: Some(default_store_id.into()),
        }
    }

    /// Parse a registry from TOML
    pub fn from_toml_str(content: &str) -> PaymentResult<Self> {
        toml::from_str(content)
            .map_err(|e| PaymentError::Configuration(format!("invalid store config: {}", e)))
    }

    /// Add a store to the registry
    pub fn add(&mut self, store: Store) {
        self.stores.push(store);
    }

    /// Add a store with builder pattern
    pub fn with_store(mut self, store: Store) -> Self {
        self.add(store);
        self
    }

    /// Get an active store by ID
    pub fn get(&self, store_id: &str) -> Option<&Store> {
        self.stores.iter().find(|s| s.id == store_id && s.active)
    }

    /// Get the default store
    pub fn default_store(&self) -> Option<&Store> {
        self.default_store_id
            .as_ref()
            .and_then(|id| self.get(id))
            .or_else(|| self.stores.iter().find(|s| s.active))
    }

    /// Resolve a store: explicit ID must exist, `None` means the default
    pub fn resolve(&self, store_id: Option<&str>) -> PaymentResult<&Store> {
        match store_id {
            Some(id) => self.get(id).ok_or_else(|| PaymentError::StoreNotFound {
                store_id: id.to_string(),
            }),
            None => self.default_store().ok_or_else(|| {
                PaymentError::Configuration("no default store configured".to_string())
            }),
        }
    }

    /// Check if a store exists and is active
    pub fn has_store(&self, store_id: &str) -> bool {
        self.get(store_id).is_some()
    }

    /// Get number of stores
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        let store = Store::new("default", "PUB1", "secret");
        assert_eq!(store.base_url(), "https://pay-api.amazon.com/sandbox");

        let store = Store::new("jp", "PUB2", "secret")
            .with_region(Region::Jp)
            .live();
        assert_eq!(store.base_url(), "https://pay-api.amazon.jp/live");

        let store = Store::new("mock", "PUB3", "secret").with_api_base_url("http://127.0.0.1:9000/");
        assert_eq!(store.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_store_registry() {
        let registry = StoreRegistry::with_default("eu")
            .with_store(Store::new("default", "PUB1", "s1"))
            .with_store(Store::new("eu", "PUB2", "s2").with_region(Region::Eu));

        assert_eq!(registry.len(), 2);
        assert!(registry.has_store("default"));
        assert!(!registry.has_store("nonexistent"));

        assert_eq!(registry.default_store().unwrap().id, "eu");
        assert_eq!(registry.resolve(None).unwrap().id, "eu");
        assert_eq!(registry.resolve(Some("default")).unwrap().id, "default");
        assert!(matches!(
            registry.resolve(Some("nonexistent")),
            Err(PaymentError::StoreNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_registry_has_no_default() {
        let registry = StoreRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.resolve(None),
            Err(PaymentError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_toml() {
        let registry = StoreRegistry::from_toml_str(
            r#"
            default_store_id = "default"

            [[stores]]
            id = "default"
            public_key_id = "SANDBOX-PUB"
            private_key = "secret"

            [[stores]]
            id = "jp"
            public_key_id = "LIVE-PUB"
            private_key = "secret"
            region = "jp"
            sandbox = false
            "#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        let jp = registry.get("jp").unwrap();
        assert_eq!(jp.region, Region::Jp);
        assert!(!jp.sandbox);
        assert!(registry.get("default").unwrap().sandbox);
    }
}
