//! Decentralized identifiers and identity assertions for Portico.
//!
//! This crate provides:
//! - `did:key` identifiers derived from Ed25519 public keys
//! - Identity assertions: compact JWTs (`alg: EdDSA`) issued by a DID,
//!   addressed to one mini app, valid for exactly 120 seconds
//! - [`IdentityService`], which loads the long-term key from secure storage
//!   and issues profile, avatar, disconnect and error assertions
//! - Assertion verification, the contract third-party consumers implement
//!
//! Core invariants:
//! - a DID is a pure function of its public key
//! - the private key lives only in the [`SecretStore`](portico_store::SecretStore);
//!   this crate hands it out once at generation and never caches it
//! - `exp - iat == 120` for every issued assertion
//! - verification rejects expired tokens with no leeway, and tokens issued
//!   in the future beyond the configured clock skew
//!
#![deny(missing_docs)]

/// Assertion (JWT) issuing and verification.
pub mod assertion;
/// `did:key` identifiers.
pub mod did;
/// Error types for identity operations.
pub mod errors;
/// Store-backed assertion issuing.
pub mod service;

pub use assertion::{
    decode_claims, sign_assertion, verify_assertion, verify_assertion_at, AssertionClaims,
    AssertionKind, JwtHeader, ASSERTION_TTL_SECS, DEFAULT_CLOCK_SKEW_SECS,
};
pub use did::{generate_did, Did, GeneratedIdentity};
pub use errors::IdentityError;
pub use service::{system_clock, Clock, IdentityService};
