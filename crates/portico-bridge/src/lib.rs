//! Authenticated bridge between a Portico host and embedded mini-app content.
//!
//! This crate provides:
//! - [`BridgeMessage`]: request, response and error envelopes
//! - [`parse_channel_message`]: typed dispatch of untyped channel traffic
//! - [`BridgeClient`]: the content-side correlated request/response protocol
//!   with timeouts, cross-talk rejection and signature checks
//! - [`Capabilities`] / [`FacadeSlot`]: the immutable facade content calls
//! - [`HostBridge`] / [`HostSession`]: host-side dispatch and session lifecycle
//!
//! Requests travel unsigned; every host reply is sealed with the session's
//! ephemeral P-256 key and verified by the client before it settles a call.
#![deny(missing_docs)]

/// Channel message classification.
pub mod channel;
/// Content-side protocol client.
pub mod client;
/// Bridge configuration.
pub mod config;
/// Error types for bridge operations.
pub mod errors;
/// Capability facade.
pub mod facade;
/// Host-side request handling.
pub mod host;
/// In-process host/content wiring.
pub mod loopback;
/// Bridge envelopes.
pub mod message;
/// Method contract.
pub mod method;
/// Host session lifecycle.
pub mod session;

pub use channel::{parse_channel_message, ChannelMessage};
pub use client::{BridgeClient, InboundOutcome};
pub use config::{BridgeConfig, EnvironmentDescriptor};
pub use errors::{BridgeError, GENERIC_REMOTE_ERROR};
pub use facade::{Capabilities, FacadeSlot};
pub use host::{AllowList, DenyAll, GrantAll, HostBridge, PermissionPolicy};
pub use loopback::Loopback;
pub use message::{BridgeMessage, ResponsePayload};
pub use method::BridgeMethod;
pub use session::{HostSession, SessionBootstrap};
