//! # Quote Types
//!
//! The order context the adapter reads from: store, currency, grand total
//! and the reserved order id used as merchant reference.

use crate::error::{PaymentError, PaymentResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Payment intent sent with a checkout session update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentIntent {
    /// Confirm only, no authorization
    Confirm,
    /// Authorize, capture later
    Authorize,
    /// Authorize and capture in one step
    AuthorizeWithCapture,
}

impl PaymentIntent {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentIntent::Confirm => "Confirm",
            PaymentIntent::Authorize => "Authorize",
            PaymentIntent::AuthorizeWithCapture => "AuthorizeWithCapture",
        }
    }
}

impl Default for PaymentIntent {
    fn default() -> Self {
        PaymentIntent::Authorize
    }
}

/// A shopping cart being turned into an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// Quote ID
    pub id: String,

    /// Store the quote belongs to
    pub store_id: String,

    /// Quote currency (ISO 4217)
    pub currency_code: String,

    /// Grand total in major units
    pub grand_total: f64,

    /// Order id reserved for this quote, used as merchant reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_order_id: Option<String>,
}

impl Quote {
    pub fn new(
        id: impl Into<String>,
        store_id: impl Into<String>,
        currency_code: impl Into<String>,
        grand_total: f64,
    ) -> Self {
        Self {
            id: id.into(),
            store_id: store_id.into(),
            currency_code: currency_code.into(),
            grand_total,
            reserved_order_id: None,
        }
    }

    /// Builder: set reserved order id
    pub fn with_reserved_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.reserved_order_id = Some(order_id.into());
        self
    }

    /// Merchant reference, empty when none was reserved
    pub fn merchant_reference(&self) -> &str {
        self.reserved_order_id.as_deref().unwrap_or_default()
    }
}

/// Quote persistence collaborator
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Load a quote by ID
    async fn get(&self, quote_id: &str) -> PaymentResult<Quote>;

    /// Allocate an order id for the quote, persist it and return it.
    ///
    /// On success `quote.reserved_order_id` is set.
    async fn reserve_order_id(&self, quote: &mut Quote) -> PaymentResult<String>;
}

/// In-memory quote storage with sequential order ids
pub struct InMemoryQuoteRepository {
    quotes: RwLock<HashMap<String, Quote>>,
    next_order_id: AtomicU64,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self {
            quotes: RwLock::new(HashMap::new()),
            next_order_id: AtomicU64::new(1),
        }
    }

    /// Store or replace a quote
    pub async fn insert(&self, quote: Quote) {
        self.quotes.write().await.insert(quote.id.clone(), quote);
    }

    /// Number of stored quotes
    pub async fn len(&self) -> usize {
        self.quotes.read().await.len()
    }

    /// Check if no quotes are stored
    pub async fn is_empty(&self) -> bool {
        self.quotes.read().await.is_empty()
    }
}

impl Default for InMemoryQuoteRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn get(&self, quote_id: &str) -> PaymentResult<Quote> {
        self.quotes
            .read()
            .await
            .get(quote_id)
            .cloned()
            .ok_or_else(|| PaymentError::QuoteNotFound {
                quote_id: quote_id.to_string(),
            })
    }

    async fn reserve_order_id(&self, quote: &mut Quote) -> PaymentResult<String> {
        let mut quotes = self.quotes.write().await;
        let stored = quotes.get_mut(&quote.id).ok_or_else(|| {
            PaymentError::OrderReferenceAllocation(format!("quote {} is not persisted", quote.id))
        })?;

        let order_id = format!("{:09}", self.next_order_id.fetch_add(1, Ordering::SeqCst));
        stored.reserved_order_id = Some(order_id.clone());
        quote.reserved_order_id = Some(order_id.clone());
        Ok(order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_intent_wire_values() {
        assert_eq!(PaymentIntent::default(), PaymentIntent::Authorize);
        assert_eq!(
            serde_json::to_value(PaymentIntent::AuthorizeWithCapture).unwrap(),
            serde_json::json!("AuthorizeWithCapture")
        );
        assert_eq!(PaymentIntent::Confirm.as_str(), "Confirm");
    }

    #[test]
    fn test_merchant_reference() {
        let quote = Quote::new("q1", "default", "USD", 10.0);
        assert_eq!(quote.merchant_reference(), "");

        let quote = quote.with_reserved_order_id("000000042");
        assert_eq!(quote.merchant_reference(), "000000042");
    }

    #[tokio::test]
    async fn test_reserve_order_id_persists() {
        let repo = InMemoryQuoteRepository::new();
        repo.insert(Quote::new("q1", "default", "USD", 10.0)).await;

        let mut quote = repo.get("q1").await.unwrap();
        let first = repo.reserve_order_id(&mut quote).await.unwrap();

        assert_eq!(first, "000000001");
        assert_eq!(quote.reserved_order_id.as_deref(), Some("000000001"));
        assert_eq!(
            repo.get("q1").await.unwrap().reserved_order_id.as_deref(),
            Some("000000001")
        );
    }

    #[tokio::test]
    async fn test_reserve_order_id_unknown_quote() {
        let repo = InMemoryQuoteRepository::new();
        let mut quote = Quote::new("ghost", "default", "USD", 10.0);

        let err = repo.reserve_order_id(&mut quote).await.unwrap_err();
        assert!(matches!(err, PaymentError::OrderReferenceAllocation(_)));
        assert!(quote.reserved_order_id.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_quote() {
        let repo = InMemoryQuoteRepository::new();
        assert!(repo.is_empty().await);
        assert!(matches!(
            repo.get("nope").await,
            Err(PaymentError::QuoteNotFound { .. })
        ));
    }
}
