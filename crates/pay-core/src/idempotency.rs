//! # Idempotency Keys
//!
//! Fresh keys for mutating gateway calls (create charge, capture, refund).

use std::collections::HashMap;
use uuid::Uuid;

/// Header carrying the idempotency key
pub const IDEMPOTENCY_HEADER: &str = "x-amz-pay-idempotency-key";

/// Extra request headers passed through to the gateway client
pub type Headers = HashMap<String, String>;

/// Issue a new key. UUID v4, never reused within a process.
pub fn issue_key() -> String {
    Uuid::new_v4().simple().to_string()
}

/// A header map holding only a fresh idempotency key
pub fn idempotency_header() -> Headers {
    let mut headers = Headers::new();
    headers.insert(IDEMPOTENCY_HEADER.to_string(), issue_key());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_distinct() {
        let keys: HashSet<String> = (0..1000).map(|_| issue_key()).collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_header_shape() {
        let headers = idempotency_header();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[IDEMPOTENCY_HEADER].len(), 32);
    }
}
