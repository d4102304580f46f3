//! Session-scoped signing for Portico bridge messages.
//!
//! This crate provides:
//! - [`EphemeralKeyStore`]: one P-256 keypair per embedded-content session,
//!   held in memory only and indexed by its base64 public key
//! - [`HostSigner`]: signs outbound host → content envelopes
//! - [`ContentVerifier`]: the fail-closed check the embedded content runs on
//!   every inbound envelope
//!
//! Both sides derive the signed bytes through `portico_canonical::signing_input`.
//! Signatures are ECDSA P-256 over SHA-256 in IEEE-P1363 (`r ‖ s`) form,
//! base64 encoded.
//!
//! Key invariants:
//! - private scalars never leave the store and are zeroized when dropped
//! - signing with a destroyed session fails with [`KeyError::KeyNotFound`]
//! - verification returns `false` on every failure path
#![deny(missing_docs)]

/// Error types for key operations.
pub mod errors;
/// P1363 signature encoding.
pub mod signature;
/// Host-side envelope signer.
pub mod signer;
/// In-memory per-session key store.
pub mod store;
/// Content-side envelope verifier.
pub mod verifier;

pub use errors::KeyError;
pub use signature::P1363Signature;
pub use signer::HostSigner;
pub use store::{EphemeralKeyStore, SessionPublicKey};
pub use verifier::{ContentVerifier, VerifyError};
