//! Host-side envelope signer.

use std::sync::Arc;

use portico_canonical::signing_input;
use serde_json::{Map, Value};

use crate::errors::KeyError;
use crate::signature::P1363Signature;
use crate::store::{EphemeralKeyStore, SessionPublicKey};

/// Signs host → content envelopes with a session's ephemeral key.
#[derive(Clone)]
pub struct HostSigner {
    store: Arc<EphemeralKeyStore>,
}

impl HostSigner {
    /// Creates a signer backed by `store`.
    pub fn new(store: Arc<EphemeralKeyStore>) -> Self {
        Self { store }
    }

    /// Signs the signed subset of `envelope` and returns the signature.
    pub fn sign(
        &self,
        envelope: &Map<String, Value>,
        public_key: &SessionPublicKey,
    ) -> Result<P1363Signature, KeyError> {
        let input = signing_input(envelope)?;
        self.store.sign(public_key, &input)
    }

    /// Signs `envelope` and stores the base64 signature in its `signature` field.
    ///
    /// Any `signature` already present is ignored by the signed subset and
    /// overwritten.
    pub fn seal(
        &self,
        envelope: &mut Map<String, Value>,
        public_key: &SessionPublicKey,
    ) -> Result<(), KeyError> {
        let signature = self.sign(envelope, public_key)?;
        envelope.insert("signature".to_string(), Value::String(signature.to_base64()));
        Ok(())
    }

    /// The store this signer draws keys from.
    pub fn store(&self) -> &Arc<EphemeralKeyStore> {
        &self.store
    }
}
