//! # Gateway Client Traits
//!
//! Collaborator seams between the adapter and the remote payment API.
//!
//! ```text
//! ┌──────────────┐  create(store)  ┌────────────────────────────┐
//! │ClientFactory │ ──────────────▶ │ GatewayClient (per store)  │
//! └──────────────┘                 │  ├── get_checkout_session  │
//!                                  │  ├── create_charge         │
//!                                  │  ├── ...                   │
//!                                  │  └── generate_button_sig.  │
//!                                  └────────────────────────────┘
//!                                                ▲
//!                              ┌─────────────────┴──────────────┐
//!                      ┌───────┴────────┐              ┌────────┴─────────┐
//!                      │HttpGatewayClient│             │RecordingGateway  │
//!                      │   (reqwest)     │             │Client (in-proc)  │
//!                      └────────────────┘              └──────────────────┘
//! ```
//!
//! Every call except signature generation returns a `RawResponse`. Transport
//! failures are folded into a response with no status and no body; they are
//! never raised through this trait.

use crate::error::PaymentResult;
use crate::idempotency::Headers;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Raw transport result: HTTP status plus unparsed body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponse {
    /// HTTP status code, absent when the request never completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Response body, absent when the transport produced none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl RawResponse {
    pub fn new(status: u16, response: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            response: Some(response.into()),
        }
    }

    /// Status without a body
    pub fn status_only(status: u16) -> Self {
        Self {
            status: Some(status),
            response: None,
        }
    }

    /// Request never completed
    pub fn absent() -> Self {
        Self::default()
    }
}

/// One method per gateway operation, bound to a single store's credentials.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    async fn get_checkout_session(&self, checkout_session_id: &str) -> RawResponse;

    async fn update_checkout_session(
        &self,
        checkout_session_id: &str,
        payload: &Value,
    ) -> RawResponse;

    /// Complete a session. The payload arrives already serialized.
    async fn complete_checkout_session(
        &self,
        checkout_session_id: &str,
        payload: &str,
    ) -> RawResponse;

    async fn get_charge(&self, charge_id: &str) -> RawResponse;

    async fn create_charge(&self, payload: &Value, headers: &Headers) -> RawResponse;

    async fn capture_charge(
        &self,
        charge_id: &str,
        payload: &Value,
        headers: &Headers,
    ) -> RawResponse;

    async fn create_refund(&self, payload: &Value, headers: &Headers) -> RawResponse;

    async fn get_refund(&self, refund_id: &str) -> RawResponse;

    async fn get_charge_permission(&self, charge_permission_id: &str) -> RawResponse;

    async fn cancel_charge(&self, charge_id: &str, payload: &Value) -> RawResponse;

    async fn close_charge_permission(
        &self,
        charge_permission_id: &str,
        payload: &Value,
    ) -> RawResponse;

    async fn get_buyer(&self, buyer_token: &str) -> RawResponse;

    /// Sign a button payload for the client-side widget
    fn generate_button_signature(&self, payload: &str) -> PaymentResult<String>;
}

/// Type alias for a shared gateway client (dynamic dispatch)
pub type BoxedGatewayClient = Arc<dyn GatewayClient>;

/// Produces a client bound to a store. `None` selects the default store.
pub trait ClientFactory: Send + Sync {
    fn create(&self, store_id: Option<&str>) -> PaymentResult<BoxedGatewayClient>;
}

/// Resolves named routes to absolute URLs
pub trait UrlBuilder: Send + Sync {
    fn route_url(&self, route: &str) -> String;
}

/// `UrlBuilder` that joins routes onto a fixed base URL
#[derive(Debug, Clone)]
pub struct BaseUrlBuilder {
    /// Base URL of the storefront (e.g., "https://shop.example.com")
    pub base_url: String,
}

impl BaseUrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl UrlBuilder for BaseUrlBuilder {
    fn route_url(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }
}

impl Default for BaseUrlBuilder {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
