//! Signature encoding shared by signer and verifier.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use p256::ecdsa::Signature;

use crate::errors::KeyError;

/// Length of a raw `r ‖ s` P-256 signature.
pub const P1363_LEN: usize = 64;

/// ECDSA P-256 signature in IEEE-P1363 form (`r ‖ s`, 32 bytes each).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct P1363Signature([u8; P1363_LEN]);

impl P1363Signature {
    /// Wraps raw `r ‖ s` bytes.
    pub fn from_bytes(bytes: [u8; P1363_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw `r ‖ s` bytes.
    pub fn as_bytes(&self) -> &[u8; P1363_LEN] {
        &self.0
    }

    /// Base64 (standard alphabet, padded) encoding used on the wire.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Decodes the wire form. Anything that is not exactly 64 bytes is rejected.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| KeyError::InvalidSignature(e.to_string()))?;
        let raw: [u8; P1363_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            KeyError::InvalidSignature(format!("expected {P1363_LEN} bytes, got {}", v.len()))
        })?;
        Ok(Self(raw))
    }

    pub(crate) fn to_ecdsa(self) -> Result<Signature, KeyError> {
        Signature::from_slice(&self.0).map_err(|e| KeyError::InvalidSignature(e.to_string()))
    }
}

impl From<Signature> for P1363Signature {
    fn from(signature: Signature) -> Self {
        let mut raw = [0u8; P1363_LEN];
        raw.copy_from_slice(&signature.to_bytes());
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_lengths_and_alphabet() {
        assert!(P1363Signature::from_base64("bad").is_err());
        assert!(P1363Signature::from_base64(&STANDARD.encode([1u8; 63])).is_err());
        assert!(P1363Signature::from_base64(&STANDARD.encode([1u8; 64])).is_ok());
    }
}
