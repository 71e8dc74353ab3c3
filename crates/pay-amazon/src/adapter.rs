//! # Adapter
//!
//! `AmazonPayAdapter` wires the orchestrators to their collaborators.
//! Every dependency is passed in at construction; nothing is read from
//! process-wide state.
//!
//! ```rust,ignore
//! let adapter = AmazonPayAdapter::new(factory, config, quotes, urls);
//!
//! let outcome = adapter.charges().authorize(&request).await?;
//! let refund = adapter.charges().create_refund("default", "C01-...", 10.0, "EUR").await?;
//! ```

use crate::button::ButtonPayloadSigner;
use crate::charge::ChargeLifecycleOrchestrator;
use crate::checkout::CheckoutSessionOrchestrator;
use crate::config::AmazonPayConfig;
use crate::permission::ChargePermissionOrchestrator;
use crate::response::{GatewayResponse, ResponseProcessor};
use pay_core::{BoxedGatewayClient, ClientFactory, PaymentResult, QuoteRepository, RawResponse, UrlBuilder};
use serde_json::Value;
use std::sync::Arc;

/// Collaborators shared by every orchestrator
#[derive(Clone)]
pub struct AdapterContext {
    clients: Arc<dyn ClientFactory>,
    config: Arc<AmazonPayConfig>,
    processor: ResponseProcessor,
}

impl AdapterContext {
    pub fn new(clients: Arc<dyn ClientFactory>, config: AmazonPayConfig) -> Self {
        let processor = ResponseProcessor::new(config.logging_enabled);
        Self {
            clients,
            config: Arc::new(config),
            processor,
        }
    }

    pub fn config(&self) -> &AmazonPayConfig {
        &self.config
    }

    pub(crate) fn client(&self, store_id: Option<&str>) -> PaymentResult<BoxedGatewayClient> {
        self.clients.create(store_id)
    }

    pub(crate) fn process(&self, raw: RawResponse, operation: &str, args: Value) -> GatewayResponse {
        self.processor.process(raw, operation, &args)
    }
}

/// Facade over the checkout, permission, charge and button components
#[derive(Clone)]
pub struct AmazonPayAdapter {
    checkout: CheckoutSessionOrchestrator,
    permissions: ChargePermissionOrchestrator,
    charges: ChargeLifecycleOrchestrator,
    buttons: ButtonPayloadSigner,
}

impl AmazonPayAdapter {
    pub fn new(
        clients: Arc<dyn ClientFactory>,
        config: AmazonPayConfig,
        quotes: Arc<dyn QuoteRepository>,
        urls: Arc<dyn UrlBuilder>,
    ) -> Self {
        let ctx = AdapterContext::new(clients, config);
        let checkout = CheckoutSessionOrchestrator::new(ctx.clone(), Arc::clone(&quotes));
        let permissions = ChargePermissionOrchestrator::new(ctx.clone());
        let charges = ChargeLifecycleOrchestrator::new(
            ctx.clone(),
            checkout.clone(),
            permissions.clone(),
            quotes,
        );
        let buttons = ButtonPayloadSigner::new(ctx, urls);

        Self {
            checkout,
            permissions,
            charges,
            buttons,
        }
    }

    pub fn checkout(&self) -> &CheckoutSessionOrchestrator {
        &self.checkout
    }

    pub fn permissions(&self) -> &ChargePermissionOrchestrator {
        &self.permissions
    }

    pub fn charges(&self) -> &ChargeLifecycleOrchestrator {
        &self.charges
    }

    pub fn buttons(&self) -> &ButtonPayloadSigner {
        &self.buttons
    }
}
