//! # Charge Permissions
//!
//! Inspect and close charge permissions. Only a permission in state
//! `Chargeable` may have charges created against it.

use crate::adapter::AdapterContext;
use crate::response::GatewayResponse;
use pay_core::PaymentResult;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

/// Gateway limit on `closureReason`, in characters
pub const MAX_CLOSURE_REASON_CHARS: usize = 255;

/// Charge permission state as reported in `statusDetails.state`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargePermissionState {
    Chargeable,
    NonChargeable,
    Closed,
    /// Any other gateway-defined state, kept verbatim
    Other(String),
}

impl ChargePermissionState {
    pub fn parse(state: &str) -> Self {
        match state {
            "Chargeable" => ChargePermissionState::Chargeable,
            "NonChargeable" => ChargePermissionState::NonChargeable,
            "Closed" => ChargePermissionState::Closed,
            other => ChargePermissionState::Other(other.to_string()),
        }
    }

    /// State of a `getChargePermission` response, if it carries one
    pub fn of(response: &GatewayResponse) -> Option<Self> {
        response.state().map(Self::parse)
    }

    pub fn is_chargeable(&self) -> bool {
        matches!(self, ChargePermissionState::Chargeable)
    }
}

/// Truncate a closure reason to the gateway limit
pub fn truncate_reason(reason: &str) -> &str {
    match reason.char_indices().nth(MAX_CLOSURE_REASON_CHARS) {
        Some((idx, _)) => &reason[..idx],
        None => reason,
    }
}

/// Charge permission operations
#[derive(Clone)]
pub struct ChargePermissionOrchestrator {
    ctx: AdapterContext,
}

impl ChargePermissionOrchestrator {
    pub fn new(ctx: AdapterContext) -> Self {
        Self { ctx }
    }

    /// Fetch a charge permission
    #[instrument(skip(self))]
    pub async fn get_charge_permission(
        &self,
        store_id: &str,
        charge_permission_id: &str,
    ) -> PaymentResult<GatewayResponse> {
        let raw = self
            .ctx
            .client(Some(store_id))?
            .get_charge_permission(charge_permission_id)
            .await;

        Ok(self.ctx.process(
            raw,
            "getChargePermission",
            json!({"store_id": store_id, "charge_permission_id": charge_permission_id}),
        ))
    }

    /// Close a permission, optionally cancelling charges still pending under it
    #[instrument(skip(self, reason))]
    pub async fn close_charge_permission(
        &self,
        store_id: &str,
        charge_permission_id: &str,
        reason: &str,
        cancel_pending_charges: bool,
    ) -> PaymentResult<GatewayResponse> {
        let payload = serde_json::to_value(ClosePayload {
            closure_reason: truncate_reason(reason),
            cancel_pending_charges,
        })?;

        let raw = self
            .ctx
            .client(Some(store_id))?
            .close_charge_permission(charge_permission_id, &payload)
            .await;

        Ok(self.ctx.process(
            raw,
            "closeChargePermission",
            json!({
                "store_id": store_id,
                "charge_permission_id": charge_permission_id,
                "reason": reason,
                "cancel_pending_charges": cancel_pending_charges,
            }),
        ))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClosePayload<'a> {
    closure_reason: &'a str,
    cancel_pending_charges: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AmazonPayConfig;
    use crate::recording::RecordingGatewayClient;
    use pay_core::RawResponse;
    use serde_json::json;
    use std::sync::Arc;

    fn orchestrator(client: &RecordingGatewayClient) -> ChargePermissionOrchestrator {
        ChargePermissionOrchestrator::new(AdapterContext::new(
            Arc::new(client.clone()),
            AmazonPayConfig::new("client-1"),
        ))
    }

    #[test]
    fn test_state_parsing() {
        assert!(ChargePermissionState::parse("Chargeable").is_chargeable());
        assert_eq!(
            ChargePermissionState::parse("NonChargeable"),
            ChargePermissionState::NonChargeable
        );
        assert_eq!(
            ChargePermissionState::parse("Closed"),
            ChargePermissionState::Closed
        );
        let other = ChargePermissionState::parse("chargeable");
        assert_eq!(other, ChargePermissionState::Other("chargeable".to_string()));
        assert!(!other.is_chargeable());
    }

    #[test]
    fn test_truncate_reason() {
        let short = "Order cancelled by customer";
        assert_eq!(truncate_reason(short), short);

        let exact = "x".repeat(255);
        assert_eq!(truncate_reason(&exact), exact);

        let long = "y".repeat(300);
        assert_eq!(truncate_reason(&long).chars().count(), 255);

        // multi-byte characters are never split
        let wide = "é".repeat(260);
        let truncated = truncate_reason(&wide);
        assert_eq!(truncated.chars().count(), 255);
        assert_eq!(truncated, "é".repeat(255));
    }

    #[tokio::test]
    async fn test_close_charge_permission_truncates() {
        let client = RecordingGatewayClient::new();
        let permissions = orchestrator(&client);

        let reason = "r".repeat(400);
        permissions
            .close_charge_permission("default", "P01", &reason, true)
            .await
            .unwrap();

        let call = client.last_call().unwrap();
        assert_eq!(call.operation, "close_charge_permission");
        assert_eq!(call.resource_id.as_deref(), Some("P01"));
        let payload = call.payload.unwrap();
        assert_eq!(payload["closureReason"].as_str().unwrap().len(), 255);
        assert_eq!(payload["cancelPendingCharges"], json!(true));
    }

    #[tokio::test]
    async fn test_close_charge_permission_defaults() {
        let client = RecordingGatewayClient::new();
        let permissions = orchestrator(&client);

        permissions
            .close_charge_permission("default", "P02", "Duplicate order", false)
            .await
            .unwrap();

        assert_eq!(
            client.last_call().unwrap().payload,
            Some(json!({"closureReason": "Duplicate order", "cancelPendingCharges": false}))
        );
    }

    #[tokio::test]
    async fn test_get_charge_permission_state() {
        let client = RecordingGatewayClient::new();
        client.respond_with(RawResponse::new(
            200,
            r#"{"chargePermissionId":"P03","statusDetails":{"state":"NonChargeable"}}"#,
        ));
        let permissions = orchestrator(&client);

        let response = permissions.get_charge_permission("default", "P03").await.unwrap();

        assert_eq!(
            ChargePermissionState::of(&response),
            Some(ChargePermissionState::NonChargeable)
        );
    }
}
