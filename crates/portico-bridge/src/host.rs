//! Host-side request handling.
//!
//! [`HostBridge`] answers content requests for one session: it dispatches by
//! method, fetches assertions through the identity service, and seals every
//! reply with the session key before it goes back on the channel.

use std::collections::HashSet;
use std::sync::Arc;

use portico_canonical::MessageKind;
use portico_identity::{Did, IdentityService};
use portico_keys::{HostSigner, SessionPublicKey};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::channel::{parse_channel_message, ChannelMessage};
use crate::config::BridgeConfig;
use crate::errors::BridgeError;
use crate::message::{BridgeMessage, ResponsePayload};
use crate::method::BridgeMethod;
use crate::session::HostSession;

/// Host decision on permission requests for supported permissions.
pub trait PermissionPolicy: Send + Sync {
    /// Whether `permission` is granted.
    fn decide(&self, permission: &str) -> bool;
}

/// Grants every supported permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantAll;

impl PermissionPolicy for GrantAll {
    fn decide(&self, _permission: &str) -> bool {
        true
    }
}

/// Denies everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl PermissionPolicy for DenyAll {
    fn decide(&self, _permission: &str) -> bool {
        false
    }
}

/// Grants only the listed permissions.
#[derive(Debug, Clone, Default)]
pub struct AllowList(HashSet<String>);

impl AllowList {
    /// Builds the list.
    pub fn new<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(permissions.into_iter().map(Into::into).collect())
    }
}

impl PermissionPolicy for AllowList {
    fn decide(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Answers bridge requests for one session.
pub struct HostBridge {
    config: BridgeConfig,
    signer: HostSigner,
    session_key: SessionPublicKey,
    identity: IdentityService,
    did: Did,
    audience: Option<String>,
    policy: Arc<dyn PermissionPolicy>,
}

impl HostBridge {
    /// Creates a handler for `session`, issuing assertions as `did`.
    ///
    /// Permissions are denied until a policy is set with
    /// [`with_policy`](Self::with_policy).
    pub fn new(session: &HostSession, identity: IdentityService, did: Did) -> Self {
        Self {
            config: session.config().clone(),
            signer: HostSigner::new(session.store().clone()),
            session_key: session.public_key().clone(),
            identity,
            did,
            audience: None,
            policy: Arc::new(DenyAll),
        }
    }

    /// Addresses issued assertions to `audience` (the mini app).
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Sets the permission policy.
    pub fn with_policy(mut self, policy: Arc<dyn PermissionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Handles one raw channel message; returns the signed reply, if any.
    ///
    /// Non-bridge traffic and non-requests produce no reply. So does a
    /// request arriving after the session key is gone: nothing can be signed.
    pub fn handle_message(&self, raw: &str) -> Option<String> {
        let request = match parse_channel_message(raw, &self.config.domain) {
            ChannelMessage::Bridge(message) => message,
            other => {
                trace!(kind = other.label(), "host ignoring channel traffic");
                return None;
            }
        };
        if request.kind() != MessageKind::Request {
            trace!(request_id = %request.request_id(), "host ignoring non-request");
            return None;
        }

        let method_name = request.message_type().method().to_string();
        let method = BridgeMethod::from_name(&method_name);
        let outcome = match method {
            Some(method) => self.dispatch(method, &request),
            None => Err(BridgeError::UnknownMethod(method_name)),
        };

        let mut reply = match outcome {
            Ok(payload) => BridgeMessage::response(
                request.message_type(),
                request.request_id(),
                now_ms(),
                payload,
            ),
            Err(err) => {
                debug!(
                    request_id = %request.request_id(),
                    code = err.code(),
                    error = %err,
                    "answering with error"
                );
                let text = err.to_content_message();
                let assertion = match self.identity.error_assertion(
                    &self.did,
                    err.code(),
                    &text,
                    self.audience.as_deref(),
                ) {
                    Ok(jwt) => Some(jwt),
                    Err(cause) => {
                        warn!(
                            request_id = %request.request_id(),
                            did = %self.did,
                            error = %cause,
                            "error envelope goes out without an assertion"
                        );
                        None
                    }
                };
                BridgeMessage::error(
                    request.message_type(),
                    request.request_id(),
                    now_ms(),
                    &text,
                    assertion,
                )
            }
        };

        let sealed = self.signer.seal(reply.as_map_mut(), &self.session_key);

        if method == Some(BridgeMethod::Close)
            && self.signer.store().destroy_session(&self.session_key)
        {
            info!(key = %self.session_key.short(), "session closed by content");
        }

        match sealed {
            Ok(()) => Some(reply.to_json()),
            Err(err) => {
                error!(
                    request_id = %request.request_id(),
                    key = %self.session_key.short(),
                    error = %err,
                    "failed to sign bridge reply"
                );
                None
            }
        }
    }

    fn dispatch(
        &self,
        method: BridgeMethod,
        request: &BridgeMessage,
    ) -> Result<ResponsePayload, BridgeError> {
        let audience = self.audience.as_deref();
        match method {
            BridgeMethod::GetProfileDetails => Ok(ResponsePayload::Jwt(
                self.identity.profile_assertion(&self.did, audience)?,
            )),
            BridgeMethod::GetAvatar => Ok(ResponsePayload::Jwt(
                self.identity.avatar_assertion(&self.did, audience)?,
            )),
            BridgeMethod::RequestPermission => {
                let permission = request
                    .param("permission")
                    .and_then(Value::as_str)
                    .ok_or_else(|| BridgeError::InvalidParams("permission".into()))?;
                let granted = self.config.environment.supports(permission)
                    && self.policy.decide(permission);
                info!(permission, granted, "permission requested");
                Ok(ResponsePayload::Result(Value::Bool(granted)))
            }
            BridgeMethod::Close => Ok(ResponsePayload::Jwt(
                self.identity.disconnect_assertion(&self.did, audience)?,
            )),
        }
    }

    /// Answers every request from `inbound` on `outbound` until either closes.
    pub async fn run(
        self,
        mut inbound: mpsc::UnboundedReceiver<String>,
        outbound: mpsc::UnboundedSender<String>,
    ) {
        while let Some(raw) = inbound.recv().await {
            if let Some(reply) = self.handle_message(&raw) {
                if outbound.send(reply).is_err() {
                    break;
                }
            }
        }
        debug!("host bridge loop finished");
    }
}
