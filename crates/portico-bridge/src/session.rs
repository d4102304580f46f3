//! Host-side session lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use portico_keys::{EphemeralKeyStore, SessionPublicKey};
use serde::{Deserialize, Serialize};

use crate::config::{BridgeConfig, EnvironmentDescriptor};

/// Everything content receives at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBootstrap {
    /// Base64 uncompressed P-256 session public key.
    pub public_key: String,
    /// Capability descriptor.
    pub environment: EnvironmentDescriptor,
    /// Message domain.
    pub domain: String,
}

/// One embedded-content session: owns its ephemeral signing key.
///
/// The key is destroyed by [`end`](Self::end) or on drop.
pub struct HostSession {
    store: Arc<EphemeralKeyStore>,
    public_key: SessionPublicKey,
    config: BridgeConfig,
    ended: AtomicBool,
}

impl HostSession {
    /// Mints a session key and returns the session with its bootstrap data.
    pub fn open(store: Arc<EphemeralKeyStore>, config: BridgeConfig) -> (Self, SessionBootstrap) {
        let public_key = store.create_session();
        let bootstrap = SessionBootstrap {
            public_key: public_key.as_str().to_string(),
            environment: config.environment.clone(),
            domain: config.domain.clone(),
        };
        let session = Self {
            store,
            public_key,
            config,
            ended: AtomicBool::new(false),
        };
        (session, bootstrap)
    }

    /// The session's public key.
    pub fn public_key(&self) -> &SessionPublicKey {
        &self.public_key
    }

    /// Configuration the session was opened with.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Key store holding the session key.
    pub fn store(&self) -> &Arc<EphemeralKeyStore> {
        &self.store
    }

    /// Whether the session key is still live.
    pub fn is_active(&self) -> bool {
        !self.ended.load(Ordering::SeqCst) && self.store.contains(&self.public_key)
    }

    /// Destroys the session key. Returns `false` if it was already gone.
    pub fn end(&self) -> bool {
        if self.ended.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.store.destroy_session(&self.public_key)
    }
}

impl Drop for HostSession {
    fn drop(&mut self) {
        self.end();
    }
}
