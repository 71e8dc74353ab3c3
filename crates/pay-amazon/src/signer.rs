//! # Request Signing
//!
//! Signs outgoing gateway requests and button payloads.
//!
//! The signing scheme is pluggable through `RequestSigner`. `HmacRequestSigner`
//! signs with HMAC-SHA256 over a canonical request string, hex encoded.

use pay_core::{PaymentError, PaymentResult};

/// Canonical request to sign
#[derive(Debug, Clone, Copy)]
pub struct CanonicalRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub date: &'a str,
    pub body: &'a str,
}

impl CanonicalRequest<'_> {
    /// `METHOD\npath\ndate\nbody`
    pub fn to_signing_string(&self) -> String {
        format!("{}\n{}\n{}\n{}", self.method, self.path, self.date, self.body)
    }
}

/// Produces signatures for a single store's credentials
pub trait RequestSigner: Send + Sync {
    /// Value of the `authorization` header for a request
    fn authorization(&self, request: &CanonicalRequest<'_>) -> PaymentResult<String>;

    /// Signature for a button payload
    fn sign_payload(&self, payload: &str) -> PaymentResult<String>;
}

/// HMAC-SHA256 signer keyed by the store's private key
pub struct HmacRequestSigner {
    public_key_id: String,
    secret: String,
}

impl HmacRequestSigner {
    pub fn new(public_key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            public_key_id: public_key_id.into(),
            secret: secret.into(),
        }
    }

    /// Verify a payload signature (constant-time)
    pub fn verify_payload(&self, payload: &str, signature: &str) -> PaymentResult<bool> {
        let expected = compute_hmac_sha256(&self.secret, payload)?;
        Ok(constant_time_compare(&expected, signature))
    }
}

impl RequestSigner for HmacRequestSigner {
    fn authorization(&self, request: &CanonicalRequest<'_>) -> PaymentResult<String> {
        let signature = compute_hmac_sha256(&self.secret, &request.to_signing_string())?;
        Ok(format!(
            "HMAC-SHA256 PublicKeyId={}, SignedHeaders=x-amz-pay-date, Signature={}",
            self.public_key_id, signature
        ))
    }

    fn sign_payload(&self, payload: &str) -> PaymentResult<String> {
        compute_hmac_sha256(&self.secret, payload)
    }
}

fn compute_hmac_sha256(secret: &str, message: &str) -> PaymentResult<String> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::Signature(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_string() {
        let request = CanonicalRequest {
            method: "POST",
            path: "/v2/charges",
            date: "20261016T120000Z",
            body: "{}",
        };
        assert_eq!(
            request.to_signing_string(),
            "POST\n/v2/charges\n20261016T120000Z\n{}"
        );
    }

    #[test]
    fn test_authorization_header() {
        let signer = HmacRequestSigner::new("PUB-1", "secret");
        let request = CanonicalRequest {
            method: "GET",
            path: "/v2/charges/C01",
            date: "20261016T120000Z",
            body: "",
        };

        let header = signer.authorization(&request).unwrap();
        assert!(header.starts_with("HMAC-SHA256 PublicKeyId=PUB-1, "));
        assert_eq!(header, signer.authorization(&request).unwrap());
    }

    #[test]
    fn test_payload_signature_roundtrip() {
        let signer = HmacRequestSigner::new("PUB-1", "secret");
        let signature = signer.sign_payload(r#"{"storeId":"client-1"}"#).unwrap();

        assert_eq!(signature.len(), 64);
        assert!(signer.verify_payload(r#"{"storeId":"client-1"}"#, &signature).unwrap());
        assert!(!signer.verify_payload(r#"{"storeId":"client-2"}"#, &signature).unwrap());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
