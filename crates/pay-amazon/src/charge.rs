//! # Charge Lifecycle
//!
//! Create, capture and cancel charges, issue refunds, and the composite
//! `authorize` used by the order payment command.
//!
//! Create, capture and refund carry a fresh idempotency key so a retry
//! triggered by the calling workflow has at most one effect. The adapter
//! itself never retries.

use crate::adapter::AdapterContext;
use crate::checkout::CheckoutSessionOrchestrator;
use crate::permission::{ChargePermissionOrchestrator, ChargePermissionState};
use crate::response::GatewayResponse;
use pay_core::{
    checked_price, idempotency_header, Headers, Money, PaymentError, PaymentResult,
    QuoteRepository, IDEMPOTENCY_HEADER,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Default reason for cancelling a charge
pub const DEFAULT_CANCELLATION_REASON: &str = "ADMIN VOID";

/// Input to `authorize`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizeRequest {
    /// Quote being paid for
    pub quote_id: String,

    /// Amount to charge, in the quote's currency
    pub amount: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_permission_id: Option<String>,
}

/// What `authorize` did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AuthorizeOutcome {
    /// A checkout session id was given; its state is for the caller to read
    CheckoutSession { checkout_session: GatewayResponse },

    /// The permission was chargeable and a captured charge was requested
    Charged {
        charge_permission: GatewayResponse,
        charge: GatewayResponse,
    },

    /// The permission was not chargeable (or could not be read); no charge was created
    NotChargeable { charge_permission: GatewayResponse },
}

impl AuthorizeOutcome {
    /// The response the caller acts on
    pub fn response(&self) -> &GatewayResponse {
        match self {
            AuthorizeOutcome::CheckoutSession { checkout_session } => checkout_session,
            AuthorizeOutcome::Charged { charge, .. } => charge,
            AuthorizeOutcome::NotChargeable { charge_permission } => charge_permission,
        }
    }

    pub fn charge_created(&self) -> bool {
        matches!(self, AuthorizeOutcome::Charged { .. })
    }
}

/// Charge and refund operations
#[derive(Clone)]
pub struct ChargeLifecycleOrchestrator {
    ctx: AdapterContext,
    checkout: CheckoutSessionOrchestrator,
    permissions: ChargePermissionOrchestrator,
    quotes: Arc<dyn QuoteRepository>,
}

impl ChargeLifecycleOrchestrator {
    pub fn new(
        ctx: AdapterContext,
        checkout: CheckoutSessionOrchestrator,
        permissions: ChargePermissionOrchestrator,
        quotes: Arc<dyn QuoteRepository>,
    ) -> Self {
        Self {
            ctx,
            checkout,
            permissions,
            quotes,
        }
    }

    /// Fetch a charge
    #[instrument(skip(self))]
    pub async fn get_charge(&self, store_id: &str, charge_id: &str) -> PaymentResult<GatewayResponse> {
        let raw = self.ctx.client(Some(store_id))?.get_charge(charge_id).await;

        Ok(self.ctx.process(
            raw,
            "getCharge",
            json!({"store_id": store_id, "charge_id": charge_id}),
        ))
    }

    /// Create a charge against a permission
    #[instrument(skip(self))]
    pub async fn create_charge(
        &self,
        store_id: &str,
        charge_permission_id: &str,
        amount: f64,
        currency_code: &str,
        capture_now: bool,
    ) -> PaymentResult<GatewayResponse> {
        let charge_amount = chargeable_price(amount, currency_code)?;
        let payload = serde_json::to_value(CreateChargePayload {
            charge_permission_id,
            charge_amount,
            capture_now,
        })?;
        let headers = idempotency_header();

        let raw = self
            .ctx
            .client(Some(store_id))?
            .create_charge(&payload, &headers)
            .await;

        Ok(self.ctx.process(
            raw,
            "createCharge",
            json!({
                "store_id": store_id,
                "charge_permission_id": charge_permission_id,
                "amount": amount,
                "currency_code": currency_code,
                "capture_now": capture_now,
            }),
        ))
    }

    /// Capture an authorized charge.
    ///
    /// `extra_headers` are sent along, but the idempotency key is always
    /// the adapter's own.
    #[instrument(skip(self, extra_headers))]
    pub async fn capture_charge(
        &self,
        store_id: &str,
        charge_id: &str,
        amount: f64,
        currency_code: &str,
        extra_headers: Headers,
    ) -> PaymentResult<GatewayResponse> {
        let capture_amount = chargeable_price(amount, currency_code)?;
        let payload = serde_json::to_value(CapturePayload { capture_amount })?;
        let header_names: Vec<String> = extra_headers.keys().cloned().collect();
        let headers = merge_idempotency_header(extra_headers);

        let raw = self
            .ctx
            .client(Some(store_id))?
            .capture_charge(charge_id, &payload, &headers)
            .await;

        Ok(self.ctx.process(
            raw,
            "captureCharge",
            json!({
                "store_id": store_id,
                "charge_id": charge_id,
                "amount": amount,
                "currency_code": currency_code,
                "headers": header_names,
            }),
        ))
    }

    /// Cancel a charge that has not been captured
    #[instrument(skip(self))]
    pub async fn cancel_charge(
        &self,
        store_id: &str,
        charge_id: &str,
        reason: &str,
    ) -> PaymentResult<GatewayResponse> {
        let payload = serde_json::to_value(CancelPayload {
            cancellation_reason: reason,
        })?;

        let raw = self
            .ctx
            .client(Some(store_id))?
            .cancel_charge(charge_id, &payload)
            .await;

        Ok(self.ctx.process(
            raw,
            "cancelCharge",
            json!({"store_id": store_id, "charge_id": charge_id, "reason": reason}),
        ))
    }

    /// Refund (part of) a captured charge
    #[instrument(skip(self))]
    pub async fn create_refund(
        &self,
        store_id: &str,
        charge_id: &str,
        amount: f64,
        currency_code: &str,
    ) -> PaymentResult<GatewayResponse> {
        let refund_amount = chargeable_price(amount, currency_code)?;
        let payload = serde_json::to_value(RefundPayload {
            charge_id,
            refund_amount,
        })?;
        let headers = idempotency_header();

        let raw = self
            .ctx
            .client(Some(store_id))?
            .create_refund(&payload, &headers)
            .await;

        Ok(self.ctx.process(
            raw,
            "createRefund",
            json!({
                "store_id": store_id,
                "charge_id": charge_id,
                "amount": amount,
                "currency_code": currency_code,
            }),
        ))
    }

    /// Fetch a refund
    #[instrument(skip(self))]
    pub async fn get_refund(&self, store_id: &str, refund_id: &str) -> PaymentResult<GatewayResponse> {
        let raw = self.ctx.client(Some(store_id))?.get_refund(refund_id).await;

        Ok(self.ctx.process(
            raw,
            "getRefund",
            json!({"store_id": store_id, "refund_id": refund_id}),
        ))
    }

    /// Authorize payment for a quote.
    ///
    /// With a checkout session id, returns the session for the caller to
    /// inspect. With a charge permission id, creates a captured charge for
    /// `request.amount` only if the permission is `Chargeable`. Two
    /// sequential gateway calls at most, no rollback, no retry.
    #[instrument(skip(self, request), fields(quote_id = %request.quote_id))]
    pub async fn authorize(&self, request: &AuthorizeRequest) -> PaymentResult<AuthorizeOutcome> {
        let checkout_session_id = non_empty(request.checkout_session_id.as_deref());
        let charge_permission_id = non_empty(request.charge_permission_id.as_deref());

        if checkout_session_id.is_none() && charge_permission_id.is_none() {
            return Err(PaymentError::MissingAuthorizeReference);
        }

        let quote = self.quotes.get(&request.quote_id).await?;

        if let Some(session_id) = checkout_session_id {
            let checkout_session = self
                .checkout
                .get_checkout_session(&quote.store_id, session_id)
                .await?;
            return Ok(AuthorizeOutcome::CheckoutSession { checkout_session });
        }

        let permission_id = charge_permission_id.ok_or(PaymentError::MissingAuthorizeReference)?;
        let charge_permission = self
            .permissions
            .get_charge_permission(&quote.store_id, permission_id)
            .await?;

        let state = ChargePermissionState::of(&charge_permission);
        if !state.as_ref().is_some_and(ChargePermissionState::is_chargeable) {
            info!(
                charge_permission_id = permission_id,
                state = ?state,
                "Charge permission not chargeable, no charge created"
            );
            return Ok(AuthorizeOutcome::NotChargeable { charge_permission });
        }

        let charge = self
            .create_charge(
                &quote.store_id,
                permission_id,
                request.amount,
                &quote.currency_code,
                true,
            )
            .await?;

        Ok(AuthorizeOutcome::Charged {
            charge_permission,
            charge,
        })
    }
}

/// Caller headers first, then a fresh idempotency key that always wins
fn merge_idempotency_header(mut headers: Headers) -> Headers {
    headers.retain(|name, _| {
        let clash = name.eq_ignore_ascii_case(IDEMPOTENCY_HEADER);
        if clash {
            warn!(header = %name, "Ignoring caller-supplied idempotency key");
        }
        !clash
    });
    headers.extend(idempotency_header());
    headers
}

fn chargeable_price(amount: f64, currency_code: &str) -> PaymentResult<Money> {
    checked_price(amount, currency_code).ok_or_else(|| PaymentError::InvalidPrice {
        message: format!(
            "amount must be finite, non-negative and representable in {}, got {}",
            currency_code, amount
        ),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

// =============================================================================
// Wire payloads
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateChargePayload<'a> {
    charge_permission_id: &'a str,
    charge_amount: Money,
    capture_now: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CapturePayload {
    capture_amount: Money,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CancelPayload<'a> {
    cancellation_reason: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefundPayload<'a> {
    charge_id: &'a str,
    refund_amount: Money,
}
