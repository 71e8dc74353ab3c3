//! # HTTP Gateway Client
//!
//! `GatewayClient` over the Amazon Pay v2 REST API using reqwest.
//! One client per store; `HttpClientFactory` builds them from the
//! `StoreRegistry`.
//!
//! Transport failures are logged and folded into a `RawResponse` with no
//! status and no body. Retries are left to the calling workflow.

use crate::signer::{CanonicalRequest, HmacRequestSigner, RequestSigner};
use async_trait::async_trait;
use chrono::Utc;
use pay_core::{
    BoxedGatewayClient, ClientFactory, GatewayClient, Headers, PaymentError, PaymentResult,
    RawResponse, Region, Store, StoreRegistry,
};
use reqwest::{Client, Method};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Request timeout for gateway calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Headers set by the client itself; caller copies are dropped
const CLIENT_OWNED_HEADERS: &[&str] = &[
    "accept",
    "content-type",
    "x-amz-pay-region",
    "x-amz-pay-date",
    "authorization",
];

/// Amazon Pay v2 client bound to one store
pub struct HttpGatewayClient {
    client: Client,
    base_url: String,
    region: Region,
    signer: Arc<dyn RequestSigner>,
}

impl HttpGatewayClient {
    /// Create a client for `store` using the given signer
    pub fn new(store: &Store, signer: Arc<dyn RequestSigner>) -> PaymentResult<Self> {
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PaymentError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: store.base_url(),
            region: store.region,
            signer,
        })
    }

    /// Create a client signing with the store's own key
    pub fn from_store(store: &Store) -> PaymentResult<Self> {
        let signer = HmacRequestSigner::new(&store.public_key_id, &store.private_key);
        Self::new(store, Arc::new(signer))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        headers: &Headers,
    ) -> RawResponse {
        let url = format!("{}{}", self.base_url, path);
        let date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let body = body.unwrap_or_default();

        let authorization = match self.signer.authorization(&CanonicalRequest {
            method: method.as_str(),
            path,
            date: &date,
            body: &body,
        }) {
            Ok(value) => value,
            Err(e) => {
                warn!(%url, error = %e, "Could not sign gateway request");
                return RawResponse::absent();
            }
        };

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .header("x-amz-pay-region", self.region.as_str())
            .header("x-amz-pay-date", date.as_str())
            .header("authorization", authorization);

        for (name, value) in headers {
            if is_client_owned(name) {
                warn!(header = %name, "Ignoring caller-supplied signed header");
                continue;
            }
            request = request.header(name.as_str(), value.as_str());
        }

        if !body.is_empty() {
            request = request.body(body);
        }

        debug!(%method, %url, "Sending gateway request");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%method, %url, error = %e, "Gateway request failed");
                return RawResponse::absent();
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(text) if text.is_empty() => RawResponse::status_only(status),
            Ok(text) => RawResponse::new(status, text),
            Err(e) => {
                warn!(%url, status, error = %e, "Could not read gateway response body");
                RawResponse::status_only(status)
            }
        }
    }

    async fn send_json(
        &self,
        method: Method,
        path: &str,
        payload: &Value,
        headers: &Headers,
    ) -> RawResponse {
        match serde_json::to_string(payload) {
            Ok(body) => self.send(method, path, Some(body), headers).await,
            Err(e) => {
                warn!(path, error = %e, "Could not serialize gateway payload");
                RawResponse::absent()
            }
        }
    }
}

#[async_trait]
impl GatewayClient for HttpGatewayClient {
    async fn get_checkout_session(&self, checkout_session_id: &str) -> RawResponse {
        let path = format!("/v2/checkoutSessions/{}", checkout_session_id);
        self.send(Method::GET, &path, None, &Headers::new()).await
    }

    async fn update_checkout_session(&self, checkout_session_id: &str, payload: &Value) -> RawResponse {
        let path = format!("/v2/checkoutSessions/{}", checkout_session_id);
        self.send_json(Method::PATCH, &path, payload, &Headers::new()).await
    }

    async fn complete_checkout_session(&self, checkout_session_id: &str, payload: &str) -> RawResponse {
        let path = format!("/v2/checkoutSessions/{}/complete", checkout_session_id);
        self.send(Method::POST, &path, Some(payload.to_string()), &Headers::new())
            .await
    }

    async fn get_charge(&self, charge_id: &str) -> RawResponse {
        let path = format!("/v2/charges/{}", charge_id);
        self.send(Method::GET, &path, None, &Headers::new()).await
    }

    async fn create_charge(&self, payload: &Value, headers: &Headers) -> RawResponse {
        self.send_json(Method::POST, "/v2/charges", payload, headers).await
    }

    async fn capture_charge(&self, charge_id: &str, payload: &Value, headers: &Headers) -> RawResponse {
        let path = format!("/v2/charges/{}/capture", charge_id);
        self.send_json(Method::POST, &path, payload, headers).await
    }

    async fn create_refund(&self, payload: &Value, headers: &Headers) -> RawResponse {
        self.send_json(Method::POST, "/v2/refunds", payload, headers).await
    }

    async fn get_refund(&self, refund_id: &str) -> RawResponse {
        let path = format!("/v2/refunds/{}", refund_id);
        self.send(Method::GET, &path, None, &Headers::new()).await
    }

    async fn get_charge_permission(&self, charge_permission_id: &str) -> RawResponse {
        let path = format!("/v2/chargePermissions/{}", charge_permission_id);
        self.send(Method::GET, &path, None, &Headers::new()).await
    }

    async fn cancel_charge(&self, charge_id: &str, payload: &Value) -> RawResponse {
        let path = format!("/v2/charges/{}/cancel", charge_id);
        self.send_json(Method::DELETE, &path, payload, &Headers::new()).await
    }

    async fn close_charge_permission(&self, charge_permission_id: &str, payload: &Value) -> RawResponse {
        let path = format!("/v2/chargePermissions/{}/close", charge_permission_id);
        self.send_json(Method::DELETE, &path, payload, &Headers::new()).await
    }

    async fn get_buyer(&self, buyer_token: &str) -> RawResponse {
        let path = format!("/v2/buyers/{}", buyer_token);
        self.send(Method::GET, &path, None, &Headers::new()).await
    }

    fn generate_button_signature(&self, payload: &str) -> PaymentResult<String> {
        self.signer.sign_payload(payload)
    }
}

fn is_client_owned(name: &str) -> bool {
    CLIENT_OWNED_HEADERS
        .iter()
        .any(|owned| name.eq_ignore_ascii_case(owned))
}

/// Builds one `HttpGatewayClient` per active store up front
pub struct HttpClientFactory {
    registry: StoreRegistry,
    clients: HashMap<String, BoxedGatewayClient>,
}

impl HttpClientFactory {
    pub fn new(registry: StoreRegistry) -> PaymentResult<Self> {
        let mut clients: HashMap<String, BoxedGatewayClient> = HashMap::new();
        for store in registry.stores.iter().filter(|s| s.active) {
            let client = HttpGatewayClient::from_store(store)?;
            debug!(store_id = %store.id, base_url = client.base_url(), "Gateway client ready");
            clients.insert(store.id.clone(), Arc::new(client));
        }
        Ok(Self { registry, clients })
    }

    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }
}

impl ClientFactory for HttpClientFactory {
    fn create(&self, store_id: Option<&str>) -> PaymentResult<BoxedGatewayClient> {
        let store = self.registry.resolve(store_id)?;
        self.clients
            .get(&store.id)
            .cloned()
            .ok_or_else(|| PaymentError::StoreNotFound {
                store_id: store.id.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_resolves_default_and_named_stores() {
        let registry = StoreRegistry::with_default("default")
            .with_store(Store::new("default", "PUB1", "s1"))
            .with_store(Store::new("jp", "PUB2", "s2").with_region(Region::Jp));
        let factory = HttpClientFactory::new(registry).unwrap();

        assert!(factory.create(None).is_ok());
        assert!(factory.create(Some("jp")).is_ok());
        assert!(matches!(
            factory.create(Some("eu")),
            Err(PaymentError::StoreNotFound { .. })
        ));
    }

    #[test]
    fn test_client_owned_headers_match_case_insensitively() {
        assert!(is_client_owned("Authorization"));
        assert!(is_client_owned("X-Amz-Pay-Date"));
        assert!(!is_client_owned("x-amz-pay-idempotency-key"));
        assert!(!is_client_owned("x-amz-pay-test"));
    }

    #[test]
    fn test_button_signature_uses_store_key() {
        let store = Store::new("default", "PUB1", "s1");
        let client = HttpGatewayClient::from_store(&store).unwrap();
        let signature = client.generate_button_signature("{}").unwrap();

        let expected = HmacRequestSigner::new("PUB1", "s1").sign_payload("{}").unwrap();
        assert_eq!(signature, expected);
    }
}
