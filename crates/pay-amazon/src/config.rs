//! # Amazon Pay Configuration
//!
//! Merchant-level settings read by the adapter.
//! Loaded from environment variables; store credentials live in the
//! `StoreRegistry` instead.

use pay_core::PaymentError;
use serde_json::Value;
use std::env;

/// Merchant-level adapter configuration
#[derive(Debug, Clone)]
pub struct AmazonPayConfig {
    /// Client (store) id shown to the button widget
    pub client_id: String,

    /// Where the buyer lands after the checkout result
    pub checkout_result_url: String,

    /// Where the buyer lands to review checkout
    pub checkout_review_url: String,

    /// Store name shown on the payment page
    pub store_name: String,

    /// Platform id reported to the gateway
    pub platform_id: String,

    /// Whether pending authorizations are accepted
    pub can_handle_pending_authorization: bool,

    /// Optional delivery specifications for the checkout button
    pub delivery_specifications: Option<Value>,

    /// Log successful gateway responses at debug level
    pub logging_enabled: bool,
}

impl AmazonPayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `AMAZON_PAY_CLIENT_ID`
    ///
    /// Optional: `AMAZON_PAY_CHECKOUT_RESULT_URL`, `AMAZON_PAY_CHECKOUT_REVIEW_URL`,
    /// `AMAZON_PAY_STORE_NAME`, `AMAZON_PAY_PLATFORM_ID`,
    /// `AMAZON_PAY_PENDING_AUTHORIZATION`, `AMAZON_PAY_DELIVERY_SPECIFICATIONS`,
    /// `AMAZON_PAY_LOGGING`.
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok();

        let client_id = env::var("AMAZON_PAY_CLIENT_ID").map_err(|_| {
            PaymentError::Configuration("AMAZON_PAY_CLIENT_ID not set".to_string())
        })?;

        if client_id.trim().is_empty() {
            return Err(PaymentError::Configuration(
                "AMAZON_PAY_CLIENT_ID must not be empty".to_string(),
            ));
        }

        let delivery_specifications = match env::var("AMAZON_PAY_DELIVERY_SPECIFICATIONS") {
            Ok(raw) if !raw.trim().is_empty() => Some(serde_json::from_str(&raw).map_err(|e| {
                PaymentError::Configuration(format!(
                    "AMAZON_PAY_DELIVERY_SPECIFICATIONS is not valid JSON: {}",
                    e
                ))
            })?),
            _ => None,
        };

        Ok(Self {
            client_id,
            checkout_result_url: env::var("AMAZON_PAY_CHECKOUT_RESULT_URL").unwrap_or_else(|_| {
                "http://localhost:8080/amazon_pay/checkout/completeSession".to_string()
            }),
            checkout_review_url: env::var("AMAZON_PAY_CHECKOUT_REVIEW_URL")
                .unwrap_or_else(|_| "http://localhost:8080/checkout/review".to_string()),
            store_name: env::var("AMAZON_PAY_STORE_NAME").unwrap_or_default(),
            platform_id: env::var("AMAZON_PAY_PLATFORM_ID").unwrap_or_default(),
            can_handle_pending_authorization: env_flag("AMAZON_PAY_PENDING_AUTHORIZATION"),
            delivery_specifications,
            logging_enabled: env_flag("AMAZON_PAY_LOGGING"),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            checkout_result_url: String::new(),
            checkout_review_url: String::new(),
            store_name: String::new(),
            platform_id: String::new(),
            can_handle_pending_authorization: false,
            delivery_specifications: None,
            logging_enabled: false,
        }
    }

    /// Builder: set checkout result and review URLs
    pub fn with_return_urls(
        mut self,
        result_url: impl Into<String>,
        review_url: impl Into<String>,
    ) -> Self {
        self.checkout_result_url = result_url.into();
        self.checkout_review_url = review_url.into();
        self
    }

    /// Builder: set store name
    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = name.into();
        self
    }

    /// Builder: set platform id
    pub fn with_platform_id(mut self, platform_id: impl Into<String>) -> Self {
        self.platform_id = platform_id.into();
        self
    }

    /// Builder: accept pending authorizations
    pub fn with_pending_authorization(mut self, enabled: bool) -> Self {
        self.can_handle_pending_authorization = enabled;
        self
    }

    /// Builder: set delivery specifications
    pub fn with_delivery_specifications(mut self, specs: Value) -> Self {
        self.delivery_specifications = Some(specs);
        self
    }

    /// Builder: enable success-response logging
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let config = AmazonPayConfig::new("amzn1.application-oa2-client.abc")
            .with_store_name("Example Store")
            .with_platform_id("A1PLATFORM")
            .with_pending_authorization(true)
            .with_delivery_specifications(json!({"addressRestrictions": {"type": "Allowed"}}))
            .with_logging(true);

        assert_eq!(config.client_id, "amzn1.application-oa2-client.abc");
        assert_eq!(config.store_name, "Example Store");
        assert!(config.can_handle_pending_authorization);
        assert!(config.delivery_specifications.is_some());
        assert!(config.logging_enabled);
    }

    #[test]
    fn test_env_flag_values() {
        env::set_var("PAY_AMAZON_TEST_FLAG_ON", "True");
        env::set_var("PAY_AMAZON_TEST_FLAG_OFF", "0");
        assert!(env_flag("PAY_AMAZON_TEST_FLAG_ON"));
        assert!(!env_flag("PAY_AMAZON_TEST_FLAG_OFF"));
        assert!(!env_flag("PAY_AMAZON_TEST_FLAG_MISSING"));
    }
}
