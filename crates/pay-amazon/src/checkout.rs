//! # Checkout Sessions
//!
//! Read, update and complete checkout sessions created by the button widget.
//! Completing a session turns it into a charge permission on the gateway.

use crate::adapter::AdapterContext;
use crate::response::GatewayResponse;
use pay_core::{create_price, Money, PaymentIntent, PaymentResult, Quote, QuoteRepository};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Platform and version string sent as merchant custom information
pub fn merchant_custom_information() -> String {
    format!(
        "Platform: pay-adapter-rs, Adapter Version: {} (v2)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Checkout session operations
#[derive(Clone)]
pub struct CheckoutSessionOrchestrator {
    ctx: AdapterContext,
    quotes: Arc<dyn QuoteRepository>,
}

impl CheckoutSessionOrchestrator {
    pub fn new(ctx: AdapterContext, quotes: Arc<dyn QuoteRepository>) -> Self {
        Self { ctx, quotes }
    }

    /// Fetch a checkout session
    #[instrument(skip(self))]
    pub async fn get_checkout_session(
        &self,
        store_id: &str,
        checkout_session_id: &str,
    ) -> PaymentResult<GatewayResponse> {
        let raw = self
            .ctx
            .client(Some(store_id))?
            .get_checkout_session(checkout_session_id)
            .await;

        Ok(self.ctx.process(
            raw,
            "getCheckoutSession",
            json!({"store_id": store_id, "checkout_session_id": checkout_session_id}),
        ))
    }

    /// Set payment details and merchant metadata on a session.
    ///
    /// Reserves an order id on the quote first if it has none. A failed
    /// reservation is logged and the update goes out with an empty
    /// merchant reference.
    #[instrument(skip(self, quote), fields(quote_id = %quote.id))]
    pub async fn update_checkout_session(
        &self,
        quote: &mut Quote,
        checkout_session_id: &str,
        payment_intent: PaymentIntent,
    ) -> PaymentResult<GatewayResponse> {
        if quote.reserved_order_id.is_none() {
            if let Err(e) = self.quotes.reserve_order_id(quote).await {
                debug!(quote_id = %quote.id, error = %e, "Could not reserve order id");
            }
        }

        let config = self.ctx.config();
        let payload = serde_json::to_value(UpdateCheckoutSessionPayload {
            web_checkout_details: WebCheckoutDetails {
                checkout_result_return_url: &config.checkout_result_url,
            },
            payment_details: PaymentDetails {
                payment_intent,
                can_handle_pending_authorization: config.can_handle_pending_authorization,
                charge_amount: create_price(quote.grand_total, &quote.currency_code),
            },
            merchant_metadata: MerchantMetadata {
                merchant_reference_id: quote.merchant_reference(),
                merchant_store_name: &config.store_name,
                custom_information: merchant_custom_information(),
            },
            platform_id: &config.platform_id,
        })?;

        let raw = self
            .ctx
            .client(Some(&quote.store_id))?
            .update_checkout_session(checkout_session_id, &payload)
            .await;

        Ok(self.ctx.process(
            raw,
            "updateCheckoutSession",
            json!({
                "quote_id": quote.id,
                "checkout_session_id": checkout_session_id,
                "payment_intent": payment_intent.as_str(),
            }),
        ))
    }

    /// Complete a session for the final amount.
    ///
    /// The client receives the payload as serialized JSON text.
    #[instrument(skip(self))]
    pub async fn complete_checkout_session(
        &self,
        store_id: &str,
        checkout_session_id: &str,
        amount: f64,
        currency_code: &str,
    ) -> PaymentResult<GatewayResponse> {
        let payload = serde_json::to_string(&CompleteCheckoutSessionPayload {
            charge_amount: create_price(amount, currency_code),
        })?;

        let raw = self
            .ctx
            .client(Some(store_id))?
            .complete_checkout_session(checkout_session_id, &payload)
            .await;

        Ok(self.ctx.process(
            raw,
            "completeCheckoutSession",
            json!({
                "store_id": store_id,
                "checkout_session_id": checkout_session_id,
                "amount": amount,
                "currency_code": currency_code,
            }),
        ))
    }

    /// Buyer profile behind a sign-in token, using the default store
    #[instrument(skip(self, buyer_token))]
    pub async fn get_buyer(&self, buyer_token: &str) -> PaymentResult<GatewayResponse> {
        let raw = self.ctx.client(None)?.get_buyer(buyer_token).await;
        Ok(self.ctx.process(raw, "getBuyer", json!({"buyer_token": "[redacted]"})))
    }
}

// =============================================================================
// Wire payloads
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCheckoutSessionPayload<'a> {
    web_checkout_details: WebCheckoutDetails<'a>,
    payment_details: PaymentDetails,
    merchant_metadata: MerchantMetadata<'a>,
    platform_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebCheckoutDetails<'a> {
    checkout_result_return_url: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentDetails {
    payment_intent: PaymentIntent,
    can_handle_pending_authorization: bool,
    charge_amount: Money,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MerchantMetadata<'a> {
    merchant_reference_id: &'a str,
    merchant_store_name: &'a str,
    custom_information: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompleteCheckoutSessionPayload {
    charge_amount: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AmazonPayConfig;
    use crate::recording::{RecordedCall, RecordingGatewayClient};
    use pay_core::{InMemoryQuoteRepository, PaymentError, RawResponse};
    use serde_json::json;

    fn config() -> AmazonPayConfig {
        AmazonPayConfig::new("client-1")
            .with_return_urls("https://shop.test/result", "https://shop.test/review")
            .with_store_name("Test Shop")
            .with_platform_id("PLATFORM1")
            .with_pending_authorization(true)
    }

    fn orchestrator(
        client: &RecordingGatewayClient,
        quotes: Arc<InMemoryQuoteRepository>,
    ) -> CheckoutSessionOrchestrator {
        let ctx = AdapterContext::new(Arc::new(client.clone()), config());
        CheckoutSessionOrchestrator::new(ctx, quotes)
    }

    #[tokio::test]
    async fn test_get_checkout_session_delegates() {
        let client = RecordingGatewayClient::new();
        client.respond_with(RawResponse::new(
            200,
            r#"{"checkoutSessionId":"CS1","statusDetails":{"state":"Open"}}"#,
        ));
        let checkout = orchestrator(&client, Arc::new(InMemoryQuoteRepository::new()));

        let response = checkout.get_checkout_session("default", "CS1").await.unwrap();

        assert!(response.is_success());
        assert_eq!(response.state(), Some("Open"));
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].operation, "get_checkout_session");
        assert_eq!(calls[0].resource_id.as_deref(), Some("CS1"));
        assert!(calls[0].headers.is_empty());
    }

    #[tokio::test]
    async fn test_update_checkout_session_payload() {
        let quotes = Arc::new(InMemoryQuoteRepository::new());
        let mut quote = Quote::new("q1", "default", "USD", 42.5).with_reserved_order_id("100000007");
        quotes.insert(quote.clone()).await;

        let client = RecordingGatewayClient::new();
        let checkout = orchestrator(&client, quotes);

        let response = checkout
            .update_checkout_session(&mut quote, "CS1", PaymentIntent::Authorize)
            .await
            .unwrap();
        assert!(response.is_success());

        let call = client.last_call().unwrap();
        assert_eq!(call.operation, "update_checkout_session");
        assert_eq!(
            call.payload,
            Some(json!({
                "webCheckoutDetails": {"checkoutResultReturnUrl": "https://shop.test/result"},
                "paymentDetails": {
                    "paymentIntent": "Authorize",
                    "canHandlePendingAuthorization": true,
                    "chargeAmount": {"amount": 42.5, "currencyCode": "USD"}
                },
                "merchantMetadata": {
                    "merchantReferenceId": "100000007",
                    "merchantStoreName": "Test Shop",
                    "customInformation": merchant_custom_information()
                },
                "platformId": "PLATFORM1"
            }))
        );
    }

    #[tokio::test]
    async fn test_update_checkout_session_reserves_order_id() {
        let quotes = Arc::new(InMemoryQuoteRepository::new());
        let mut quote = Quote::new("q2", "default", "JPY", 1500.4);
        quotes.insert(quote.clone()).await;

        let client = RecordingGatewayClient::new();
        let checkout = orchestrator(&client, Arc::clone(&quotes));

        checkout
            .update_checkout_session(&mut quote, "CS2", PaymentIntent::AuthorizeWithCapture)
            .await
            .unwrap();

        assert_eq!(quote.reserved_order_id.as_deref(), Some("000000001"));
        let payload = client.last_call().unwrap().payload.unwrap();
        assert_eq!(payload["merchantMetadata"]["merchantReferenceId"], json!("000000001"));
        assert_eq!(payload["paymentDetails"]["paymentIntent"], json!("AuthorizeWithCapture"));
        assert_eq!(
            payload["paymentDetails"]["chargeAmount"],
            json!({"amount": 1500, "currencyCode": "JPY"})
        );
    }

    #[tokio::test]
    async fn test_update_checkout_session_survives_reservation_failure() {
        // Quote is not persisted, so reservation fails
        let quotes = Arc::new(InMemoryQuoteRepository::new());
        let mut quote = Quote::new("unsaved", "default", "EUR", 10.0);

        let client = RecordingGatewayClient::new();
        let checkout = orchestrator(&client, quotes);

        let response = checkout
            .update_checkout_session(&mut quote, "CS3", PaymentIntent::default())
            .await
            .unwrap();

        assert!(response.is_success());
        assert!(quote.reserved_order_id.is_none());
        let payload = client.last_call().unwrap().payload.unwrap();
        assert_eq!(payload["merchantMetadata"]["merchantReferenceId"], json!(""));
    }

    #[tokio::test]
    async fn test_complete_checkout_session_sends_serialized_body() {
        let client = RecordingGatewayClient::new();
        let checkout = orchestrator(&client, Arc::new(InMemoryQuoteRepository::new()));

        checkout
            .complete_checkout_session("default", "CS4", 1999.6, "JPY")
            .await
            .unwrap();

        let call = client.last_call().unwrap();
        assert_eq!(call.operation, "complete_checkout_session");
        assert_eq!(
            call.raw_body.as_deref(),
            Some(r#"{"chargeAmount":{"amount":2000,"currencyCode":"JPY"}}"#)
        );
        assert_eq!(call.payload, None);
    }

    #[tokio::test]
    async fn test_unknown_store_is_reported() {
        let client = RecordingGatewayClient::new().with_stores(&["default"]);
        let checkout = orchestrator(&client, Arc::new(InMemoryQuoteRepository::new()));

        let err = checkout.get_checkout_session("missing", "CS1").await.unwrap_err();
        assert!(matches!(err, PaymentError::StoreNotFound { .. }));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_buyer_uses_default_store() {
        let client = RecordingGatewayClient::new();
        client.respond_with(RawResponse::new(200, r#"{"buyerId":"B1","email":"a@b.c"}"#));
        let checkout = orchestrator(&client, Arc::new(InMemoryQuoteRepository::new()));

        let response = checkout.get_buyer("token-123").await.unwrap();

        assert_eq!(response.get_str("buyerId"), Some("B1"));
        let call: RecordedCall = client.last_call().unwrap();
        assert_eq!(call.store_id, None);
        assert_eq!(call.operation, "get_buyer");
    }
}
