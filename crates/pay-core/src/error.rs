//! # Payment Error Types
//!
//! Typed error handling for the payment adapter.
//!
//! Gateway-reported failures are *not* errors at this level: they come back
//! as a normalized `GatewayResponse` carrying the gateway status, so the
//! calling workflow decides on compensation. `PaymentError` covers what the
//! adapter itself refuses or cannot set up.

use thiserror::Error;

/// Core error type for adapter operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Amount rejected before reaching the gateway
    #[error("Invalid price: {message}")]
    InvalidPrice { message: String },

    /// No credentials registered for the requested store
    #[error("Store not found: {store_id}")]
    StoreNotFound { store_id: String },

    /// Quote (order context) could not be loaded
    #[error("Quote not found: {quote_id}")]
    QuoteNotFound { quote_id: String },

    /// Reserving a merchant reference id failed
    #[error("Order reference allocation failed: {0}")]
    OrderReferenceAllocation(String),

    /// Authorize was called with neither a checkout session nor a charge permission
    #[error("Authorize requires a checkout session id or a charge permission id")]
    MissingAuthorizeReference,

    /// Network/HTTP error communicating with the gateway
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Signing a request or button payload failed
    #[error("Signature error: {0}")]
    Signature(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentError::NetworkError(_))
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::InvalidPrice { .. } => 400,
            PaymentError::StoreNotFound { .. } => 404,
            PaymentError::QuoteNotFound { .. } => 404,
            PaymentError::OrderReferenceAllocation(_) => 500,
            PaymentError::MissingAuthorizeReference => 400,
            PaymentError::NetworkError(_) => 503,
            PaymentError::Signature(_) => 500,
            PaymentError::Internal(_) => 500,
            PaymentError::Serialization(_) => 500,
        }
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::Serialization(err.to_string())
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(PaymentError::NetworkError("timeout".into()).is_retryable());
        assert!(!PaymentError::InvalidRequest("bad data".into()).is_retryable());
        assert!(!PaymentError::MissingAuthorizeReference.is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PaymentError::InvalidRequest("test".into()).status_code(),
            400
        );
        assert_eq!(
            PaymentError::QuoteNotFound {
                quote_id: "q1".into()
            }
            .status_code(),
            404
        );
        assert_eq!(PaymentError::MissingAuthorizeReference.status_code(), 400);
        assert_eq!(PaymentError::NetworkError("down".into()).status_code(), 503);
    }
}
