//! Pluggable storage contracts for Portico identity data.
//!
//! This crate provides:
//! - `SecretStore`: the platform secure-storage contract (get/set/delete of
//!   opaque bytes), used for long-term Ed25519 private keys
//! - `ProfileStore`: read access to the user's profile and avatar
//! - In-memory implementations of both, and a directory-backed secret store
//!
//! Real platforms back `SecretStore` with a keychain or keystore; the
//! implementations here serve tests, tooling and single-process hosts.

#![deny(missing_docs)]

/// Error types for store operations.
pub mod error;
/// Directory-backed secret store.
pub mod file;
/// In-memory store implementations.
pub mod memory;
/// Profile and avatar records.
pub mod profile;
/// Storage traits.
pub mod traits;

pub use error::StoreError;
pub use file::FileSecretStore;
pub use memory::{MemoryProfileStore, MemorySecretStore};
pub use profile::{Avatar, Profile, Social};
pub use traits::{ProfileStore, SecretStore};
pub use zeroize::Zeroizing;
