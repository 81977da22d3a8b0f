//! Request signing
//!
//! `signature = hex(HMAC-SHA256(secret, timestamp || body))`, where `timestamp`
//! is Unix seconds as decimal text and `body` is the exact payload sent
//! (empty for GET).

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ClientError;

type HmacSha256 = Hmac<Sha256>;

/// Timestamp and signature for a single outbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Unix seconds, string-encoded
    pub timestamp: String,
    /// Lowercase hex HMAC-SHA256
    pub signature: String,
}

/// HMAC signer keyed with the shared API secret
#[derive(Clone)]
pub struct Signer {
    mac: HmacSha256,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

impl Signer {
    pub fn new(secret: &str) -> Result<Self, ClientError> {
        if secret.is_empty() {
            return Err(ClientError::EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| ClientError::EmptySecret)?;
        Ok(Self { mac })
    }

    /// Sign `body` with the current time
    pub fn sign(&self, body: &str) -> SignedRequest {
        self.sign_at(chrono::Utc::now().timestamp(), body)
    }

    /// Sign `body` as of `timestamp` (Unix seconds)
    pub fn sign_at(&self, timestamp: i64, body: &str) -> SignedRequest {
        let timestamp = timestamp.to_string();
        let signature = self.digest(&[timestamp.as_bytes(), body.as_bytes()]);
        SignedRequest {
            timestamp,
            signature,
        }
    }

    /// Check a signature in constant time
    pub fn verify(&self, signed: &SignedRequest, body: &str) -> bool {
        let Ok(expected) = hex::decode(&signed.signature) else {
            return false;
        };
        let mut mac = self.mac.clone();
        mac.update(signed.timestamp.as_bytes());
        mac.update(body.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    fn digest(&self, parts: &[&[u8]]) -> String {
        let mut mac = self.mac.clone();
        for part in parts {
            mac.update(part);
        }
        hex::encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        // Widely published HMAC-SHA256 test value
        let signer = Signer::new("key").unwrap();
        assert_eq!(
            signer.digest(&[b"The quick brown fox ", b"jumps over the lazy dog"]),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_signature_covers_timestamp_then_body() {
        let signer = Signer::new("key").unwrap();
        let signed = signer.sign_at(1_724_666_400, "{\"query\":\"rent\",\"p\":1}");
        assert_eq!(signed.timestamp, "1724666400");
        assert_eq!(
            signed.signature,
            signer.digest(&[b"1724666400{\"query\":\"rent\",\"p\":1}"])
        );
    }

    #[test]
    fn test_deterministic() {
        let signer = Signer::new("s3cret").unwrap();
        assert_eq!(signer.sign_at(1_700_000_000, ""), signer.sign_at(1_700_000_000, ""));
        assert_eq!(
            signer.sign_at(1_700_000_000, "{\"p\":2}"),
            Signer::new("s3cret").unwrap().sign_at(1_700_000_000, "{\"p\":2}")
        );
    }

    #[test]
    fn test_changes_with_body_timestamp_and_secret() {
        let signer = Signer::new("s3cret").unwrap();
        let base = signer.sign_at(1_700_000_000, "{\"query\":\"rent\"}");
        assert_ne!(base.signature, signer.sign_at(1_700_000_000, "{\"query\":\"Rent\"}").signature);
        assert_ne!(base.signature, signer.sign_at(1_700_000_001, "{\"query\":\"rent\"}").signature);
        assert_ne!(
            base.signature,
            Signer::new("s3cret!").unwrap().sign_at(1_700_000_000, "{\"query\":\"rent\"}").signature
        );
    }

    #[test]
    fn test_hex_format() {
        let signed = Signer::new("s3cret").unwrap().sign("");
        assert_eq!(signed.signature.len(), 64);
        assert!(signed.signature.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert!(signed.timestamp.parse::<i64>().unwrap() > 1_600_000_000);
    }

    #[test]
    fn test_verify() {
        let signer = Signer::new("s3cret").unwrap();
        let signed = signer.sign("body");
        assert!(signer.verify(&signed, "body"));
        assert!(!signer.verify(&signed, "bodY"));
        assert!(!signer.verify(&SignedRequest { signature: "zz".to_string(), ..signed }, "body"));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(Signer::new(""), Err(ClientError::EmptySecret)));
    }
}
