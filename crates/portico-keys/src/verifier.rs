//! Content-side envelope verifier.
//!
//! This is the check the embedded content runs on every host → content
//! message. It fails closed: any problem, from a key that could not be
//! imported to a single flipped bit, yields `false`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::VerifyingKey;
use portico_canonical::{signing_input, EnvelopeError};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::signature::P1363Signature;

/// Reason a message failed verification.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The session public key could not be imported.
    #[error("verification key unavailable")]
    Unavailable,
    /// The message is not a JSON object.
    #[error("message is not an object")]
    NotAnObject,
    /// The `signature` field is absent or not a string.
    #[error("missing signature")]
    MissingSignature,
    /// The signature is not 64 base64-encoded P1363 bytes.
    #[error("malformed signature")]
    MalformedSignature,
    /// The message does not have the signed-envelope shape.
    #[error("not a signed envelope: {0}")]
    Envelope(#[from] EnvelopeError),
    /// The signature does not match the signed subset.
    #[error("signature mismatch")]
    Mismatch,
}

/// Verifies host envelopes against the session public key.
#[derive(Debug, Clone)]
pub struct ContentVerifier {
    key: Option<VerifyingKey>,
}

impl ContentVerifier {
    /// Imports the base64 SEC1 public key delivered at session start.
    ///
    /// An unusable key does not panic; the verifier is created unavailable and
    /// rejects everything.
    pub fn new(public_key_b64: &str) -> Self {
        let key = STANDARD
            .decode(public_key_b64)
            .ok()
            .and_then(|raw| VerifyingKey::from_sec1_bytes(&raw).ok());
        if key.is_none() {
            warn!("session public key could not be imported; all messages will be rejected");
        }
        Self { key }
    }

    /// Whether the verification key was imported.
    pub fn is_available(&self) -> bool {
        self.key.is_some()
    }

    /// `true` only for a well-formed, correctly signed envelope.
    pub fn verify(&self, message: &Value) -> bool {
        self.check(message).is_ok()
    }

    /// Like [`verify`](Self::verify) but reports why a message was refused.
    pub fn check(&self, message: &Value) -> Result<(), VerifyError> {
        let key = self.key.as_ref().ok_or(VerifyError::Unavailable)?;
        let map = message.as_object().ok_or(VerifyError::NotAnObject)?;

        let encoded = map
            .get("signature")
            .and_then(Value::as_str)
            .ok_or(VerifyError::MissingSignature)?;
        let signature = P1363Signature::from_base64(encoded)
            .and_then(|sig| sig.to_ecdsa())
            .map_err(|_| VerifyError::MalformedSignature)?;

        let input = signing_input(map)?;
        key.verify(&input, &signature)
            .map_err(|_| VerifyError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unusable_key_rejects_everything() {
        let verifier = ContentVerifier::new("not base64 at all!");
        assert!(!verifier.is_available());
        let msg = json!({"type": "x", "requestId": "y", "timestamp": 1, "signature": "AA=="});
        assert!(matches!(verifier.check(&msg), Err(VerifyError::Unavailable)));
    }

    #[test]
    fn non_object_is_refused() {
        let key = STANDARD.encode(
            p256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng)
                .verifying_key()
                .to_encoded_point(false)
                .as_bytes(),
        );
        let verifier = ContentVerifier::new(&key);
        assert!(matches!(
            verifier.check(&json!("hello")),
            Err(VerifyError::NotAnObject)
        ));
        assert!(matches!(
            verifier.check(&json!({"type": "x"})),
            Err(VerifyError::MissingSignature)
        ));
    }
}
