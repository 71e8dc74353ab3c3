//! # Recording Gateway Client
//!
//! In-process `GatewayClient` + `ClientFactory` that records every call and
//! answers with scripted responses. Used by tests and for running the
//! service without gateway credentials.

use crate::signer::{HmacRequestSigner, RequestSigner};
use async_trait::async_trait;
use pay_core::{
    BoxedGatewayClient, ClientFactory, GatewayClient, Headers, PaymentError, PaymentResult,
    RawResponse,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// One recorded gateway call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Store the client was created for (`None` = default)
    pub store_id: Option<String>,
    /// Client method name (e.g., "create_charge")
    pub operation: &'static str,
    /// Path resource id, if the operation takes one
    pub resource_id: Option<String>,
    /// Structured payload
    pub payload: Option<Value>,
    /// Pre-serialized payload (complete session, button signature)
    pub raw_body: Option<String>,
    pub headers: Headers,
}

#[derive(Debug)]
struct Inner {
    calls: Vec<RecordedCall>,
    responses: VecDeque<RawResponse>,
    default_response: RawResponse,
    stores: Option<Vec<String>>,
}

/// Records calls and replays queued responses; falls back to `200 {}`
#[derive(Clone)]
pub struct RecordingGatewayClient {
    inner: Arc<Mutex<Inner>>,
    store_id: Option<String>,
}

impl RecordingGatewayClient {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                calls: Vec::new(),
                responses: VecDeque::new(),
                default_response: RawResponse::new(200, "{}"),
                stores: None,
            })),
            store_id: None,
        }
    }

    /// Only accept these store ids from the factory
    pub fn with_stores(self, stores: &[&str]) -> Self {
        self.lock().stores = Some(stores.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Response used once the queue is empty
    pub fn with_default_response(self, response: RawResponse) -> Self {
        self.lock().default_response = response;
        self
    }

    /// Queue a response for the next call
    pub fn respond_with(&self, response: RawResponse) {
        self.lock().responses.push_back(response);
    }

    /// All calls so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.lock().calls.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(
        &self,
        operation: &'static str,
        resource_id: Option<&str>,
        payload: Option<&Value>,
        raw_body: Option<&str>,
        headers: Option<&Headers>,
    ) -> RawResponse {
        let mut inner = self.lock();
        inner.calls.push(RecordedCall {
            store_id: self.store_id.clone(),
            operation,
            resource_id: resource_id.map(String::from),
            payload: payload.cloned(),
            raw_body: raw_body.map(String::from),
            headers: headers.cloned().unwrap_or_default(),
        });
        match inner.responses.pop_front() {
            Some(response) => response,
            None => inner.default_response.clone(),
        }
    }
}

impl Default for RecordingGatewayClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientFactory for RecordingGatewayClient {
    fn create(&self, store_id: Option<&str>) -> PaymentResult<BoxedGatewayClient> {
        if let (Some(id), Some(stores)) = (store_id, &self.lock().stores) {
            if !stores.iter().any(|s| s == id) {
                return Err(PaymentError::StoreNotFound {
                    store_id: id.to_string(),
                });
            }
        }
        Ok(Arc::new(Self {
            inner: Arc::clone(&self.inner),
            store_id: store_id.map(String::from),
        }))
    }
}

#[async_trait]
impl GatewayClient for RecordingGatewayClient {
    async fn get_checkout_session(&self, checkout_session_id: &str) -> RawResponse {
        self.record("get_checkout_session", Some(checkout_session_id), None, None, None)
    }

    async fn update_checkout_session(&self, checkout_session_id: &str, payload: &Value) -> RawResponse {
        self.record(
            "update_checkout_session",
            Some(checkout_session_id),
            Some(payload),
            None,
            None,
        )
    }

    async fn complete_checkout_session(&self, checkout_session_id: &str, payload: &str) -> RawResponse {
        self.record(
            "complete_checkout_session",
            Some(checkout_session_id),
            None,
            Some(payload),
            None,
        )
    }

    async fn get_charge(&self, charge_id: &str) -> RawResponse {
        self.record("get_charge", Some(charge_id), None, None, None)
    }

    async fn create_charge(&self, payload: &Value, headers: &Headers) -> RawResponse {
        self.record("create_charge", None, Some(payload), None, Some(headers))
    }

    async fn capture_charge(&self, charge_id: &str, payload: &Value, headers: &Headers) -> RawResponse {
        self.record("capture_charge", Some(charge_id), Some(payload), None, Some(headers))
    }

    async fn create_refund(&self, payload: &Value, headers: &Headers) -> RawResponse {
        self.record("create_refund", None, Some(payload), None, Some(headers))
    }

    async fn get_refund(&self, refund_id: &str) -> RawResponse {
        self.record("get_refund", Some(refund_id), None, None, None)
    }

    async fn get_charge_permission(&self, charge_permission_id: &str) -> RawResponse {
        self.record("get_charge_permission", Some(charge_permission_id), None, None, None)
    }

    async fn cancel_charge(&self, charge_id: &str, payload: &Value) -> RawResponse {
        self.record("cancel_charge", Some(charge_id), Some(payload), None, None)
    }

    async fn close_charge_permission(&self, charge_permission_id: &str, payload: &Value) -> RawResponse {
        self.record(
            "close_charge_permission",
            Some(charge_permission_id),
            Some(payload),
            None,
            None,
        )
    }

    async fn get_buyer(&self, buyer_token: &str) -> RawResponse {
        self.record("get_buyer", Some(buyer_token), None, None, None)
    }

    fn generate_button_signature(&self, payload: &str) -> PaymentResult<String> {
        self.record("generate_button_signature", None, None, Some(payload), None);
        HmacRequestSigner::new("recording", "recording").sign_payload(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_then_default() {
        let client = RecordingGatewayClient::new().with_default_response(RawResponse::status_only(404));
        client.respond_with(RawResponse::new(200, r#"{"chargeId":"C1"}"#));

        assert_eq!(client.get_charge("C1").await.status, Some(200));
        assert_eq!(client.get_charge("C2").await.status, Some(404));
        assert_eq!(client.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_factory_binds_store() {
        let factory = RecordingGatewayClient::new().with_stores(&["default", "jp"]);

        let jp = factory.create(Some("jp")).unwrap();
        jp.get_refund("R1").await;

        assert_eq!(factory.last_call().unwrap().store_id.as_deref(), Some("jp"));
        assert!(factory.create(Some("eu")).is_err());
        assert!(factory.create(None).is_ok());
    }
}
