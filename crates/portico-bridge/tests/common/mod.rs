#![allow(dead_code)]

use std::sync::Arc;

use portico_bridge::{BridgeClient, BridgeConfig, HostBridge, HostSession, SessionBootstrap};
use portico_identity::{Did, IdentityService};
use portico_keys::EphemeralKeyStore;
use portico_store::{MemoryProfileStore, MemorySecretStore, Profile};
use tokio::sync::mpsc;

pub struct Host {
    pub session: HostSession,
    pub bootstrap: SessionBootstrap,
    pub identity: IdentityService,
    pub did: Did,
    pub profiles: Arc<MemoryProfileStore>,
}

impl Host {
    pub fn bridge(&self) -> HostBridge {
        HostBridge::new(&self.session, self.identity.clone(), self.did.clone())
            .with_audience("demo.miniapp")
    }
}

pub fn alice() -> Profile {
    Profile {
        name: "Alice".to_string(),
        bio: None,
        socials: vec![],
    }
}

/// Host with a stored identity whose profile is Alice.
pub fn host(config: BridgeConfig) -> Host {
    let secrets = Arc::new(MemorySecretStore::new());
    let profiles = Arc::new(MemoryProfileStore::new());
    let identity = IdentityService::new(secrets, profiles.clone());
    let did = identity.create_identity().unwrap();
    profiles.put_profile(did.as_str(), alice());

    let (session, bootstrap) = HostSession::open(Arc::new(EphemeralKeyStore::new()), config);
    Host {
        session,
        bootstrap,
        identity,
        did,
        profiles,
    }
}

/// Client whose outbound requests land in the returned receiver.
pub fn client(
    bootstrap: &SessionBootstrap,
    config: &BridgeConfig,
) -> (BridgeClient, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (BridgeClient::new(bootstrap, config, tx), rx)
}
