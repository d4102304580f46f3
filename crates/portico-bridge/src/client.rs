//! Content-side request/response state machine.
//!
//! Each call is `Pending → {Resolved, Rejected, TimedOut}`:
//!
//! 1. a fresh UUID-v4 request id is registered in the pending table
//! 2. the unsigned request is posted to the host
//! 3. the call waits on its oneshot receiver and a timer, whichever first
//!
//! Inbound traffic goes through [`BridgeClient::handle_inbound`]. Only a
//! message whose id matches a pending entry can touch it, and removing the
//! entry from the table is the single point of settlement, so every call
//! settles exactly once.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use portico_canonical::{MessageKind, MessageType, RequestId};
use portico_keys::ContentVerifier;
use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::channel::{parse_channel_message, ChannelMessage};
use crate::config::BridgeConfig;
use crate::errors::{BridgeError, GENERIC_REMOTE_ERROR};
use crate::message::{BridgeMessage, ResponsePayload};
use crate::method::BridgeMethod;
use crate::session::SessionBootstrap;

type Settlement = Result<ResponsePayload, BridgeError>;

struct PendingRequest {
    method: BridgeMethod,
    issued_at: i64,
    settle: oneshot::Sender<Settlement>,
}

/// What [`BridgeClient::handle_inbound`] did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Not a response to any pending call.
    Ignored,
    /// Settled a pending call successfully.
    Resolved,
    /// Settled a pending call with an error.
    Rejected,
}

/// Drops the table entry if the call future is abandoned before settling.
struct PendingGuard<'a> {
    pending: &'a DashMap<RequestId, PendingRequest>,
    request_id: &'a RequestId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(self.request_id);
    }
}

struct ClientInner {
    domain: String,
    timeout: Duration,
    clock_skew_ms: i64,
    verifier: ContentVerifier,
    pending: DashMap<RequestId, PendingRequest>,
    outbound: mpsc::UnboundedSender<String>,
}

/// Content-side bridge endpoint.
#[derive(Clone)]
pub struct BridgeClient {
    inner: Arc<ClientInner>,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl BridgeClient {
    /// Creates a client for the session described by `bootstrap`.
    ///
    /// Requests are posted to `outbound`; responses must be fed to
    /// [`handle_inbound`](Self::handle_inbound).
    pub fn new(
        bootstrap: &SessionBootstrap,
        config: &BridgeConfig,
        outbound: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                domain: bootstrap.domain.clone(),
                timeout: config.request_timeout(),
                clock_skew_ms: config.clock_skew_ms(),
                verifier: ContentVerifier::new(&bootstrap.public_key),
                pending: DashMap::new(),
                outbound,
            }),
        }
    }

    /// Number of calls awaiting settlement.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    /// Calls `method` on the host and waits for its verified response.
    pub async fn call(
        &self,
        method: BridgeMethod,
        params: Map<String, Value>,
    ) -> Result<ResponsePayload, BridgeError> {
        let inner = &self.inner;
        let request_type = MessageType::request(&inner.domain, method.name())?;
        let request_id = RequestId::parse(Uuid::new_v4().to_string())?;
        let issued_at = now_ms();

        let (settle, mut settled) = oneshot::channel();
        inner.pending.insert(
            request_id.clone(),
            PendingRequest {
                method,
                issued_at,
                settle,
            },
        );
        let _guard = PendingGuard {
            pending: &inner.pending,
            request_id: &request_id,
        };

        let request = BridgeMessage::request(request_type, request_id.clone(), issued_at, params);
        if inner.outbound.send(request.to_json()).is_err() {
            return Err(BridgeError::ChannelClosed);
        }
        debug!(method = %method, request_id = %request_id, "issued bridge request");

        tokio::select! {
            outcome = &mut settled => outcome.unwrap_or(Err(BridgeError::ChannelClosed)),
            _ = tokio::time::sleep(inner.timeout) => {
                if inner.pending.remove(&request_id).is_some() {
                    debug!(method = %method, request_id = %request_id, "bridge request timed out");
                    Err(BridgeError::Timeout(inner.timeout))
                } else {
                    // settled concurrently with the timer
                    settled.await.unwrap_or(Err(BridgeError::ChannelClosed))
                }
            }
        }
    }

    /// Processes one raw message from the host side of the channel.
    pub fn handle_inbound(&self, raw: &str) -> InboundOutcome {
        let message = match parse_channel_message(raw, &self.inner.domain) {
            ChannelMessage::Bridge(message) => message,
            other => {
                trace!(kind = other.label(), "ignoring channel traffic");
                return InboundOutcome::Ignored;
            }
        };
        if message.kind() == MessageKind::Request {
            trace!("ignoring request echo");
            return InboundOutcome::Ignored;
        }

        let request_id = message.request_id().clone();
        let (expected_method, issued_at) = match self.inner.pending.get(&request_id) {
            Some(entry) => (entry.method, entry.issued_at),
            None => {
                trace!(request_id = %request_id, "ignoring response for unknown request");
                return InboundOutcome::Ignored;
            }
        };
        if message.message_type().method() != expected_method.name() {
            trace!(request_id = %request_id, "ignoring response for a different method");
            return InboundOutcome::Ignored;
        }

        let outcome = self.evaluate(&message, issued_at);
        let resolved = outcome.is_ok();

        let Some((_, pending)) = self.inner.pending.remove(&request_id) else {
            return InboundOutcome::Ignored;
        };
        debug!(
            method = %pending.method,
            request_id = %request_id,
            resolved,
            "settled bridge request"
        );
        // The caller may have given up (dropped future); nothing to do then.
        let _ = pending.settle.send(outcome);

        if resolved {
            InboundOutcome::Resolved
        } else {
            InboundOutcome::Rejected
        }
    }

    fn evaluate(&self, message: &BridgeMessage, issued_at: i64) -> Settlement {
        if let Err(reason) = self.inner.verifier.check(&message.to_value()) {
            warn!(
                request_id = %message.request_id(),
                reason = %reason,
                "rejecting response with invalid signature (potential forgery)"
            );
            return Err(BridgeError::InvalidSignature(reason.to_string()));
        }

        let sent_at = message.timestamp().unwrap_or_default();
        if sent_at < issued_at.saturating_sub(self.inner.clock_skew_ms) {
            warn!(
                request_id = %message.request_id(),
                sent_at,
                issued_at,
                "rejecting stale response (potential replay)"
            );
            return Err(BridgeError::InvalidSignature("stale response".into()));
        }

        match message.kind() {
            MessageKind::Error => Err(BridgeError::Remote {
                message: message
                    .error_text()
                    .unwrap_or(GENERIC_REMOTE_ERROR)
                    .to_string(),
                assertion: message.jwt().map(str::to_string),
            }),
            _ => message.payload().ok_or_else(|| {
                BridgeError::MalformedMessage(format!(
                    "{} response carried neither jwt nor result",
                    message.message_type().method()
                ))
            }),
        }
    }

    /// Feeds every message from `inbound` to [`handle_inbound`](Self::handle_inbound)
    /// until the channel closes.
    pub async fn run_inbound(self, mut inbound: mpsc::UnboundedReceiver<String>) {
        while let Some(raw) = inbound.recv().await {
            self.handle_inbound(&raw);
        }
        debug!("content inbound channel closed");
    }
}
