//! Store-backed assertion issuing.
//!
//! [`IdentityService`] is the host's only path from a DID to a signed
//! assertion. It reads the private key from the [`SecretStore`] for each
//! assertion and drops it (zeroized) before returning.

use std::sync::Arc;

use ed25519_dalek::SigningKey;
use portico_store::{ProfileStore, SecretStore, Zeroizing};
use serde_json::{json, Value};
use tracing::debug;

use crate::assertion::{sign_assertion, AssertionClaims, AssertionKind};
use crate::did::{generate_did, Did, GeneratedIdentity};
use crate::errors::IdentityError;

/// Source of "now" in seconds since epoch.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Wall clock.
pub fn system_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().timestamp())
}

const SECRET_KEY_PREFIX: &str = "portico.identity.";

fn secret_key_name(did: &Did) -> String {
    format!("{SECRET_KEY_PREFIX}{did}")
}

/// Issues identity assertions for DIDs whose keys live in secure storage.
#[derive(Clone)]
pub struct IdentityService {
    secrets: Arc<dyn SecretStore>,
    profiles: Arc<dyn ProfileStore>,
    clock: Clock,
}

impl IdentityService {
    /// Creates a service over the given stores, using the wall clock.
    pub fn new(secrets: Arc<dyn SecretStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            secrets,
            profiles,
            clock: system_clock(),
        }
    }

    /// Replaces the clock (tests and simulations).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Generates a new identity and stores its private key.
    pub fn create_identity(&self) -> Result<Did, IdentityError> {
        let identity = generate_did();
        self.store_identity(&identity)?;
        Ok(identity.did)
    }

    /// Stores the private key of an identity generated elsewhere.
    pub fn store_identity(&self, identity: &GeneratedIdentity) -> Result<(), IdentityError> {
        self.secrets
            .set(&secret_key_name(&identity.did), identity.private_key.as_slice())?;
        debug!(did = %identity.did, "stored identity key");
        Ok(())
    }

    /// Whether a private key is stored for `did`.
    pub fn has_identity(&self, did: &Did) -> Result<bool, IdentityError> {
        Ok(self.secrets.get(&secret_key_name(did))?.is_some())
    }

    /// Deletes the stored private key for `did`.
    pub fn forget_identity(&self, did: &Did) -> Result<(), IdentityError> {
        self.secrets.delete(&secret_key_name(did))?;
        debug!(did = %did, "deleted identity key");
        Ok(())
    }

    fn signing_key(&self, did: &Did) -> Result<SigningKey, IdentityError> {
        let stored = self
            .secrets
            .get(&secret_key_name(did))?
            .ok_or_else(|| IdentityError::NoPrivateKey(did.to_string()))?;

        let bytes: Zeroizing<[u8; 64]> = Zeroizing::new(
            stored
                .as_slice()
                .try_into()
                .map_err(|_| IdentityError::InvalidPrivateKey(did.to_string()))?,
        );
        let key = SigningKey::from_keypair_bytes(&bytes)
            .map_err(|_| IdentityError::InvalidPrivateKey(did.to_string()))?;

        if &Did::from_verifying_key(&key.verifying_key()) != did {
            return Err(IdentityError::InvalidPrivateKey(did.to_string()));
        }
        Ok(key)
    }

    /// Signs an assertion of `kind` carrying `data`, issued by `did` now.
    pub fn issue_assertion(
        &self,
        did: &Did,
        kind: AssertionKind,
        data: Value,
        audience: Option<&str>,
    ) -> Result<String, IdentityError> {
        let key = self.signing_key(did)?;

        let mut claims = AssertionClaims::new(did, kind, data, (self.clock)());
        if let Some(aud) = audience {
            claims = claims.with_audience(aud);
        }
        let token = sign_assertion(&key, &claims)?;

        debug!(did = %did, kind = ?kind, aud = ?audience, iat = claims.iat, "issued assertion");
        Ok(token)
    }

    /// Profile assertion. Fails with `NoProfile` when nothing is stored.
    pub fn profile_assertion(
        &self,
        did: &Did,
        audience: Option<&str>,
    ) -> Result<String, IdentityError> {
        let profile = self
            .profiles
            .profile(did.as_str())?
            .ok_or_else(|| IdentityError::NoProfile(did.to_string()))?;
        self.issue_assertion(
            did,
            AssertionKind::Profile,
            serde_json::to_value(profile)?,
            audience,
        )
    }

    /// Avatar assertion. A missing avatar yields `data: {"noContent": true}`.
    pub fn avatar_assertion(
        &self,
        did: &Did,
        audience: Option<&str>,
    ) -> Result<String, IdentityError> {
        let data = match self.profiles.avatar(did.as_str())? {
            Some(avatar) => serde_json::to_value(avatar)?,
            None => json!({ "noContent": true }),
        };
        self.issue_assertion(did, AssertionKind::Avatar, data, audience)
    }

    /// Notice that the host closed the session.
    pub fn disconnect_assertion(
        &self,
        did: &Did,
        audience: Option<&str>,
    ) -> Result<String, IdentityError> {
        self.issue_assertion(
            did,
            AssertionKind::Disconnect,
            json!({ "reason": "closed" }),
            audience,
        )
    }

    /// Structured host-side error.
    pub fn error_assertion(
        &self,
        did: &Did,
        code: &str,
        message: &str,
        audience: Option<&str>,
    ) -> Result<String, IdentityError> {
        self.issue_assertion(
            did,
            AssertionKind::Error,
            json!({ "code": code, "message": message }),
            audience,
        )
    }
}
