//! In-memory store for session signing keys.
//!
//! One P-256 keypair per embedded-content session, keyed by the base64 SEC1
//! uncompressed public key handed to that session. Nothing here is ever
//! written to disk; dropping the store (or the process exiting) destroys
//! every key.
//!
//! # Security
//!
//! - Private scalars are zeroized on drop (`p256::ecdsa::SigningKey` is `ZeroizeOnDrop`)
//! - `sign` holds the entry's shard lock for the duration of the signature,
//!   so a concurrent `destroy_session` either waits or makes `sign` fail
//! - Lookups never fall back to another session's key

use std::time::Instant;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use dashmap::DashMap;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use tracing::{debug, info};

use crate::errors::KeyError;
use crate::signature::P1363Signature;

/// Length of an uncompressed SEC1 P-256 point.
pub const PUBLIC_KEY_LEN: usize = 65;

/// Base64 encoding of a session's uncompressed P-256 public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionPublicKey(String);

impl SessionPublicKey {
    fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(STANDARD.encode(key.to_encoded_point(false).as_bytes()))
    }

    /// Wraps an already-encoded key (e.g. received back from a caller).
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The base64 string delivered to the embedded content.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix suitable for log lines.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        &self.0[..end]
    }
}

impl std::fmt::Display for SessionPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

struct SessionKeyPair {
    signing_key: SigningKey,
    created_at: Instant,
}

/// Volatile per-session key store.
#[derive(Default)]
pub struct EphemeralKeyStore {
    sessions: DashMap<String, SessionKeyPair>,
}

impl EphemeralKeyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh keypair for a new session and returns its public key.
    pub fn create_session(&self) -> SessionPublicKey {
        let signing_key = SigningKey::random(&mut OsRng);
        let public_key = SessionPublicKey::from_verifying_key(signing_key.verifying_key());

        self.sessions.insert(
            public_key.as_str().to_string(),
            SessionKeyPair {
                signing_key,
                created_at: Instant::now(),
            },
        );

        info!(key = %public_key.short(), "created session signing key");
        public_key
    }

    /// Signs `message` with the private key of the session `public_key`.
    pub fn sign(
        &self,
        public_key: &SessionPublicKey,
        message: &[u8],
    ) -> Result<P1363Signature, KeyError> {
        let entry = self
            .sessions
            .get(public_key.as_str())
            .ok_or_else(|| KeyError::KeyNotFound(public_key.short().to_string()))?;

        let signature: Signature = entry.signing_key.sign(message);
        debug!(
            key = %public_key.short(),
            age_ms = entry.created_at.elapsed().as_millis() as u64,
            "signed with session key"
        );
        Ok(signature.into())
    }

    /// Removes the session's key. Unknown or already-destroyed keys are a no-op.
    pub fn destroy_session(&self, public_key: &SessionPublicKey) -> bool {
        let removed = self.sessions.remove(public_key.as_str()).is_some();
        if removed {
            info!(key = %public_key.short(), "destroyed session signing key");
        }
        removed
    }

    /// Whether the session is still live.
    pub fn contains(&self, public_key: &SessionPublicKey) -> bool {
        self.sessions.contains_key(public_key.as_str())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is live.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
