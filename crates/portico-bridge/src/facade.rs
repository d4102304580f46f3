//! The capability object handed to content.
//!
//! [`Capabilities`] is the content's only entry point to the bridge: five
//! operations, no setters, no public fields. [`FacadeSlot`] installs it at
//! most once; later installs get the existing instance back.

use std::sync::{Arc, OnceLock};

use serde_json::{Map, Value};

use crate::client::BridgeClient;
use crate::config::EnvironmentDescriptor;
use crate::errors::BridgeError;
use crate::message::ResponsePayload;
use crate::method::BridgeMethod;

/// Immutable capability facade.
pub struct Capabilities {
    client: BridgeClient,
    environment: EnvironmentDescriptor,
}

fn expect_jwt(method: BridgeMethod, payload: ResponsePayload) -> Result<String, BridgeError> {
    payload.into_jwt().ok_or_else(|| {
        BridgeError::MalformedMessage(format!("{method} response did not carry a jwt"))
    })
}

impl Capabilities {
    /// Wraps a client and the descriptor from the session bootstrap.
    pub fn new(client: BridgeClient, environment: EnvironmentDescriptor) -> Self {
        Self {
            client,
            environment,
        }
    }

    /// Signed profile assertion (JWT).
    pub async fn get_profile_details(&self) -> Result<String, BridgeError> {
        let method = BridgeMethod::GetProfileDetails;
        expect_jwt(method, self.client.call(method, Map::new()).await?)
    }

    /// Signed avatar assertion (JWT).
    pub async fn get_avatar(&self) -> Result<String, BridgeError> {
        let method = BridgeMethod::GetAvatar;
        expect_jwt(method, self.client.call(method, Map::new()).await?)
    }

    /// Host descriptor, available without a round trip.
    pub fn get_environment(&self) -> &EnvironmentDescriptor {
        &self.environment
    }

    /// Asks the host for `permission`.
    pub async fn request_permission(&self, permission: &str) -> Result<bool, BridgeError> {
        let mut params = Map::new();
        params.insert("permission".into(), Value::String(permission.to_string()));
        let payload = self
            .client
            .call(BridgeMethod::RequestPermission, params)
            .await?;
        match payload {
            ResponsePayload::Result(Value::Bool(granted)) => Ok(granted),
            _ => Err(BridgeError::MalformedMessage(
                "requestPermission response did not carry a boolean".into(),
            )),
        }
    }

    /// Ends the session; resolves with the host's signed disconnect notice.
    pub async fn close(&self) -> Result<String, BridgeError> {
        let method = BridgeMethod::Close;
        expect_jwt(method, self.client.call(method, Map::new()).await?)
    }
}

/// Install-once holder for the facade.
#[derive(Default)]
pub struct FacadeSlot {
    slot: OnceLock<Arc<Capabilities>>,
}

impl FacadeSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the facade built by `build`, unless one is already present.
    ///
    /// `build` is not called when the slot is occupied.
    pub fn install<F>(&self, build: F) -> Arc<Capabilities>
    where
        F: FnOnce() -> Capabilities,
    {
        self.slot.get_or_init(|| Arc::new(build())).clone()
    }

    /// The installed facade.
    pub fn get(&self) -> Option<Arc<Capabilities>> {
        self.slot.get().cloned()
    }

    /// Whether a facade is installed.
    pub fn is_installed(&self) -> bool {
        self.slot.get().is_some()
    }
}
