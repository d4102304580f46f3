//! `did:key` identifiers for Ed25519 keys.
//!
//! `did:key:z<base58btc(0xed 0x01 ‖ public key)>`: the multicodec prefix for
//! an Ed25519 public key followed by the 32 key bytes, base58btc encoded with
//! the `z` multibase marker.

use std::sync::OnceLock;

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::errors::IdentityError;

/// Multicodec prefix for an Ed25519 public key.
pub const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

const DID_KEY_PREFIX: &str = "did:key:z";
const DID_PATTERN: &str = r"^did:key:z[1-9A-HJ-NP-Za-km-z]{40,60}$";

fn did_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(DID_PATTERN).expect("invalid regex"))
}

/// Decentralized identifier bound to one Ed25519 public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Derives the DID of `key`.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let mut prefixed = Vec::with_capacity(ED25519_MULTICODEC.len() + 32);
        prefixed.extend_from_slice(&ED25519_MULTICODEC);
        prefixed.extend_from_slice(key.as_bytes());
        Self(format!("{DID_KEY_PREFIX}{}", bs58::encode(prefixed).into_string()))
    }

    /// Parses a `did:key` string, checking that it decodes to an Ed25519 key.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentityError> {
        let s = value.into();
        if !did_pattern().is_match(&s) {
            return Err(IdentityError::InvalidDid(s));
        }
        let did = Self(s);
        did.verifying_key()?;
        Ok(did)
    }

    /// Recovers the Ed25519 public key embedded in the DID.
    pub fn verifying_key(&self) -> Result<VerifyingKey, IdentityError> {
        let invalid = || IdentityError::InvalidDid(self.0.clone());

        let encoded = self.0.strip_prefix(DID_KEY_PREFIX).ok_or_else(invalid)?;
        let decoded = bs58::decode(encoded).into_vec().map_err(|_| invalid())?;
        let key_bytes = decoded
            .strip_prefix(&ED25519_MULTICODEC[..])
            .ok_or_else(invalid)?;
        let key: [u8; 32] = key_bytes.try_into().map_err(|_| invalid())?;
        VerifyingKey::from_bytes(&key).map_err(|_| invalid())
    }

    /// Borrows the DID string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Did {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

impl AsRef<str> for Did {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output of [`generate_did`].
///
/// The caller is responsible for putting `private_key` into secure storage.
pub struct GeneratedIdentity {
    /// The new DID.
    pub did: Did,
    /// Ed25519 public key.
    pub public_key: [u8; 32],
    /// 64-byte private key: `seed ‖ public key`.
    pub private_key: Zeroizing<[u8; 64]>,
}

/// Draws a fresh 32-byte seed and derives a new Ed25519 identity.
pub fn generate_did() -> GeneratedIdentity {
    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    let signing_key = SigningKey::from_bytes(&seed);
    seed.zeroize();

    let verifying_key = signing_key.verifying_key();
    GeneratedIdentity {
        did: Did::from_verifying_key(&verifying_key),
        public_key: verifying_key.to_bytes(),
        private_key: Zeroizing::new(signing_key.to_keypair_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn did_pattern_is_compiled_once() {
        assert!(std::ptr::eq(did_pattern(), did_pattern()));
    }

    #[test]
    fn did_has_ed25519_multibase_prefix() {
        let identity = generate_did();
        assert!(
            identity.did.as_str().starts_with("did:key:z6Mk"),
            "got: {}",
            identity.did
        );
    }

    #[test]
    fn private_key_is_seed_then_public() {
        let identity = generate_did();
        assert_eq!(&identity.private_key[32..], &identity.public_key[..]);
        let restored = SigningKey::from_keypair_bytes(&identity.private_key).unwrap();
        assert_eq!(
            Did::from_verifying_key(&restored.verifying_key()),
            identity.did
        );
    }

    #[test]
    fn parse_round_trips_key() {
        let identity = generate_did();
        let parsed = Did::parse(identity.did.as_str()).unwrap();
        assert_eq!(parsed.verifying_key().unwrap().to_bytes(), identity.public_key);
    }

    #[test]
    fn parse_rejects_other_methods_and_codecs() {
        assert!(Did::parse("did:web:example.com").is_err());
        assert!(Did::parse("did:key:z0OIl").is_err());

        // secp256k1 multicodec (0xe7 0x01) is well-formed base58 but not Ed25519
        let mut prefixed = vec![0xe7, 0x01];
        prefixed.extend_from_slice(&[2u8; 33]);
        let foreign = format!("did:key:z{}", bs58::encode(prefixed).into_string());
        assert!(Did::parse(foreign).is_err());
    }

    #[test]
    fn serde_validates() {
        let identity = generate_did();
        let json = serde_json::to_string(&identity.did).unwrap();
        let back: Did = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity.did);
        assert!(serde_json::from_str::<Did>("\"did:key:nope\"").is_err());
    }
}
