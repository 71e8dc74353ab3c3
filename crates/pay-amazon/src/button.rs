//! # Button Payloads
//!
//! Static payloads consumed by the client-side button widget, and their
//! signatures.

use crate::adapter::AdapterContext;
use pay_core::{PaymentResult, UrlBuilder};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Route the buyer returns to after signing in
pub const SIGN_IN_ROUTE: &str = "amazon_pay/login/authorize/";

/// Profile scopes requested at sign-in
pub const SIGN_IN_SCOPES: &[&str] = &["name", "email"];

/// A payload together with its signature.
///
/// With `HmacRequestSigner` the signature is HMAC-SHA256, which the live
/// Amazon Pay button widget does not accept; it needs an RSA-PSS
/// `RequestSigner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedButton {
    pub payload: String,
    pub signature: String,
}

/// Builds and signs button payloads
#[derive(Clone)]
pub struct ButtonPayloadSigner {
    ctx: AdapterContext,
    urls: Arc<dyn UrlBuilder>,
}

impl ButtonPayloadSigner {
    pub fn new(ctx: AdapterContext, urls: Arc<dyn UrlBuilder>) -> Self {
        Self { ctx, urls }
    }

    /// Sign-in button payload as JSON text
    pub fn login_button_payload(&self) -> PaymentResult<String> {
        let sign_in_return_url = self.urls.route_url(SIGN_IN_ROUTE);
        let payload = LoginButtonPayload {
            sign_in_return_url: &sign_in_return_url,
            store_id: &self.ctx.config().client_id,
            sign_in_scopes: SIGN_IN_SCOPES,
        };
        Ok(serde_json::to_string(&payload)?)
    }

    /// Checkout button payload as JSON text
    pub fn checkout_button_payload(&self) -> PaymentResult<String> {
        let config = self.ctx.config();
        let payload = CheckoutButtonPayload {
            web_checkout_details: CheckoutReviewDetails {
                checkout_review_return_url: &config.checkout_review_url,
            },
            store_id: &config.client_id,
            delivery_specifications: config
                .delivery_specifications
                .as_ref()
                .filter(|specs| !is_blank(specs)),
        };
        Ok(serde_json::to_string(&payload)?)
    }

    /// Sign a payload with the given store's credentials
    #[instrument(skip(self, payload))]
    pub fn sign_button(&self, payload: &str, store_id: Option<&str>) -> PaymentResult<String> {
        self.ctx.client(store_id)?.generate_button_signature(payload)
    }

    /// Signed sign-in button
    pub fn signed_login_button(&self, store_id: Option<&str>) -> PaymentResult<SignedButton> {
        let payload = self.login_button_payload()?;
        let signature = self.sign_button(&payload, store_id)?;
        Ok(SignedButton { payload, signature })
    }

    /// Signed checkout button
    pub fn signed_checkout_button(&self, store_id: Option<&str>) -> PaymentResult<SignedButton> {
        let payload = self.checkout_button_payload()?;
        let signature = self.sign_button(&payload, store_id)?;
        Ok(SignedButton { payload, signature })
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginButtonPayload<'a> {
    sign_in_return_url: &'a str,
    store_id: &'a str,
    sign_in_scopes: &'a [&'a str],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutButtonPayload<'a> {
    web_checkout_details: CheckoutReviewDetails<'a>,
    store_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    delivery_specifications: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutReviewDetails<'a> {
    checkout_review_return_url: &'a str,
}
