//! # pay-core
//!
//! Core types and collaborator traits for the payment-lifecycle adapter.
//!
//! This crate provides:
//! - `Money` and `create_price` for currency-correct amounts
//! - Idempotency key issuing for mutating gateway calls
//! - `Quote` and `QuoteRepository` for the order context
//! - `Store` and `StoreRegistry` for per-store gateway credentials
//! - `GatewayClient`, `ClientFactory` and `UrlBuilder` collaborator traits
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{create_price, ClientFactory};
//!
//! let price = create_price(1500.4, "JPY"); // {"amount": 1500, "currencyCode": "JPY"}
//!
//! let client = factory.create(Some("default"))?;
//! let raw = client.get_charge_permission("S01-0000000-0000000").await;
//! ```

pub mod error;
pub mod gateway;
pub mod idempotency;
pub mod money;
pub mod quote;
pub mod store;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult};
pub use gateway::{
    BaseUrlBuilder, BoxedGatewayClient, ClientFactory, GatewayClient, RawResponse, UrlBuilder,
};
pub use idempotency::{idempotency_header, issue_key, Headers, IDEMPOTENCY_HEADER};
pub use money::{checked_price, create_price, Amount, Money};
pub use quote::{InMemoryQuoteRepository, PaymentIntent, Quote, QuoteRepository};
pub use store::{Region, Store, StoreRegistry};
