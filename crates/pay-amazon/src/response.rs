//! # Response Processing
//!
//! Turns a `RawResponse` from the gateway client into a normalized
//! `GatewayResponse` and decides how loudly to log it.
//!
//! Transport and parsing anomalies never raise: a missing body or a body
//! that is not a JSON object yields an empty map, and the transport status
//! is written on top. Classification only looks at `status`.

use pay_core::RawResponse;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error};

/// HTTP statuses the gateway uses for success
pub const SUCCESS_STATUSES: &[u16] = &[200, 201];

/// Key the transport status is stored under
pub const STATUS_FIELD: &str = "status";

/// Normalized gateway result: the response body plus `status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayResponse {
    body: Map<String, Value>,
}

impl GatewayResponse {
    /// Status code, if present and an integer
    pub fn status(&self) -> Option<u16> {
        self.body
            .get(STATUS_FIELD)
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok())
    }

    /// True iff the status is one of `SUCCESS_STATUSES`
    pub fn is_success(&self) -> bool {
        self.status()
            .map(|s| SUCCESS_STATUSES.contains(&s))
            .unwrap_or(false)
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// String field lookup
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }

    /// `statusDetails.state` of a session, permission, charge or refund
    pub fn state(&self) -> Option<&str> {
        self.body
            .get("statusDetails")
            .and_then(|d| d.get("state"))
            .and_then(Value::as_str)
    }

    /// Gateway error `reasonCode`, if any
    pub fn reason_code(&self) -> Option<&str> {
        self.get_str("reasonCode")
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }
}

impl From<Map<String, Value>> for GatewayResponse {
    fn from(body: Map<String, Value>) -> Self {
        Self { body }
    }
}

/// Normalizes raw client results and applies the logging policy
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseProcessor {
    logging_enabled: bool,
}

impl ResponseProcessor {
    /// `logging_enabled` turns on debug logging of successful results
    pub fn new(logging_enabled: bool) -> Self {
        Self { logging_enabled }
    }

    /// Normalize `raw`, produced by `operation` called with `args`.
    pub fn process(&self, raw: RawResponse, operation: &str, args: &Value) -> GatewayResponse {
        debug!(operation, args = %args, "{} <-", operation);

        let mut body = match raw.response {
            None => {
                debug!(operation, "Unable to {}", operation);
                Map::new()
            }
            Some(text) => parse_body(&text, operation),
        };

        if let Some(status) = raw.status {
            body.insert(STATUS_FIELD.to_string(), Value::from(status));
        }

        let response = GatewayResponse::from(body);
        if response.is_error() {
            let logged = Value::Object(response.body.clone());
            error!(
                operation,
                status = ?response.status(),
                response = %logged,
                "{} ->",
                operation
            );
        } else if self.logging_enabled {
            let logged = Value::Object(response.body.clone());
            debug!(operation, response = %logged, "{} ->", operation);
        }

        response
    }
}

fn parse_body(text: &str, operation: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            debug!(operation, body = %other, "Response body is not a JSON object");
            Map::new()
        }
        Err(e) => {
            debug!(operation, error = %e, "Malformed response body");
            Map::new()
        }
    }
}
