use std::time::Duration;

use portico_canonical::ValidationError;
use portico_identity::IdentityError;
use portico_keys::KeyError;
use thiserror::Error;

/// Fallback text when an `:error` envelope carries no message.
pub const GENERIC_REMOTE_ERROR: &str = "The host could not complete the request";

/// Bridge error types.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A response for a pending call failed verification. Never retried.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    /// No valid response arrived in time. The caller may retry.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    /// The host answered with an `:error` envelope.
    #[error("{message}")]
    Remote {
        /// Untrusted display text from the envelope.
        message: String,
        /// Signed error assertion, when the host attached one.
        assertion: Option<String>,
    },
    /// The session key is gone (session ended).
    #[error("session key not found: {0}")]
    KeyNotFound(String),
    /// The other end of the channel has gone away.
    #[error("bridge channel closed")]
    ChannelClosed,
    /// A message did not have the bridge envelope shape.
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    /// The request names a method the host does not implement.
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    /// A request is missing or has an invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParams(String),
    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
    /// Identifier validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Identity subsystem failure.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// Signing failure other than a missing key.
    #[error("signing failed: {0}")]
    Signing(String),
    /// JSON encoding failure.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<KeyError> for BridgeError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::KeyNotFound(key) => BridgeError::KeyNotFound(key),
            other => BridgeError::Signing(other.to_string()),
        }
    }
}

impl BridgeError {
    /// Whether retrying the same call can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BridgeError::Timeout(_))
    }

    /// Text safe to hand across the trust boundary to content.
    pub fn to_content_message(&self) -> String {
        match self {
            BridgeError::InvalidSignature(_) => "Response failed signature verification".into(),
            BridgeError::Timeout(_) => "The request timed out".into(),
            BridgeError::Remote { message, .. } => message.clone(),
            BridgeError::KeyNotFound(_) | BridgeError::ChannelClosed => {
                "The session has ended".into()
            }
            BridgeError::MalformedMessage(_) => "Malformed message".into(),
            BridgeError::UnknownMethod(method) => format!("Unknown method: {method}"),
            BridgeError::InvalidParams(detail) => format!("Invalid parameter: {detail}"),
            BridgeError::Identity(IdentityError::NoProfile(_)) => {
                "No profile is linked to this identity".into()
            }
            BridgeError::Identity(IdentityError::NoPrivateKey(_)) => {
                "No identity is available".into()
            }
            _ => "Internal error".into(),
        }
    }

    /// Stable code used in structured error assertions.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::InvalidSignature(_) => "INVALID_SIGNATURE",
            BridgeError::Timeout(_) => "TIMEOUT",
            BridgeError::Remote { .. } => "REMOTE",
            BridgeError::KeyNotFound(_) | BridgeError::ChannelClosed => "SESSION_ENDED",
            BridgeError::MalformedMessage(_) => "MALFORMED_MESSAGE",
            BridgeError::UnknownMethod(_) => "UNKNOWN_METHOD",
            BridgeError::InvalidParams(_) => "INVALID_PARAMS",
            BridgeError::Identity(IdentityError::NoProfile(_)) => "NO_PROFILE",
            BridgeError::Identity(IdentityError::NoPrivateKey(_)) => "NO_IDENTITY",
            _ => "INTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_message_hides_internals() {
        let err = BridgeError::Identity(IdentityError::NoPrivateKey(
            "did:key:z6MkSecretDetail".to_string(),
        ));
        assert_eq!(err.code(), "NO_IDENTITY");
        assert!(!err.to_content_message().contains("did:key"));

        let err = BridgeError::Signing("p256 internal state".to_string());
        assert_eq!(err.to_content_message(), "Internal error");
    }

    #[test]
    fn only_timeouts_retry() {
        assert!(BridgeError::Timeout(Duration::from_secs(10)).is_retryable());
        assert!(!BridgeError::InvalidSignature("x".into()).is_retryable());
    }

    #[test]
    fn missing_key_maps_through() {
        let err: BridgeError = KeyError::KeyNotFound("BAbc".into()).into();
        assert!(matches!(err, BridgeError::KeyNotFound(_)));
    }
}
