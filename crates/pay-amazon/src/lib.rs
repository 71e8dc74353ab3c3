//! # pay-amazon
//!
//! Amazon Pay v2 payment-lifecycle adapter.
//!
//! The adapter sits between the order domain and the gateway API:
//!
//! 1. **CheckoutSessionOrchestrator** - read, update and complete checkout sessions
//! 2. **ChargePermissionOrchestrator** - inspect and close charge permissions
//! 3. **ChargeLifecycleOrchestrator** - create, capture, cancel and refund charges,
//!    plus the composite `authorize`
//! 4. **ButtonPayloadSigner** - sign-in and checkout button payloads
//!
//! Every gateway result passes through `ResponseProcessor`, which merges the
//! HTTP status into the parsed body and classifies 200/201 as success.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_amazon::{AmazonPayAdapter, AmazonPayConfig, HttpClientFactory};
//! use pay_core::{BaseUrlBuilder, InMemoryQuoteRepository, StoreRegistry};
//!
//! let factory = HttpClientFactory::new(StoreRegistry::from_toml_str(&stores_toml)?)?;
//! let adapter = AmazonPayAdapter::new(
//!     Arc::new(factory),
//!     AmazonPayConfig::from_env()?,
//!     Arc::new(InMemoryQuoteRepository::new()),
//!     Arc::new(BaseUrlBuilder::new("https://shop.example.com")),
//! );
//!
//! let charge = adapter
//!     .charges()
//!     .create_charge("default", "S01-1234567-1234567", 19.99, "USD", false)
//!     .await?;
//!
//! if charge.is_error() {
//!     // do not mark the order paid
//! }
//! ```

pub mod adapter;
pub mod button;
pub mod charge;
pub mod checkout;
pub mod config;
pub mod http;
pub mod permission;
pub mod recording;
pub mod response;
pub mod signer;

// Re-exports
pub use adapter::{AdapterContext, AmazonPayAdapter};
pub use button::{ButtonPayloadSigner, SignedButton};
pub use charge::{
    AuthorizeOutcome, AuthorizeRequest, ChargeLifecycleOrchestrator, DEFAULT_CANCELLATION_REASON,
};
pub use checkout::{merchant_custom_information, CheckoutSessionOrchestrator};
pub use config::AmazonPayConfig;
pub use http::{HttpClientFactory, HttpGatewayClient};
pub use permission::{ChargePermissionOrchestrator, ChargePermissionState};
pub use recording::{RecordedCall, RecordingGatewayClient};
pub use response::{GatewayResponse, ResponseProcessor};
pub use signer::{HmacRequestSigner, RequestSigner};
