//! Canonical encoding primitives for Portico bridge messages.
//!
//! Every byte that a bridge signature covers is produced by this crate. The
//! host signer and the content verifier both go through [`signing_input`], so
//! the field selection and the key ordering are defined exactly once.
//!
//! ## Quick Start
//!
//! ```rust
//! use portico_canonical::{signing_input, Canonicalizer};
//! use serde_json::json;
//!
//! let a = Canonicalizer::new().canonicalize(&json!({"b": 1, "a": 2}))?;
//! let b = Canonicalizer::new().canonicalize(&json!({"a": 2, "b": 1}))?;
//! assert_eq!(a, b);
//!
//! let message = json!({
//!     "type": "portico:api:getAvatar:response",
//!     "requestId": "0b6f1c2e-6a7d-4e4b-9d59-2f1f3f0f6a11",
//!     "timestamp": 1700000000000u64,
//!     "jwt": "eyJ...",
//!     "signature": "ignored"
//! });
//! let bytes = signing_input(message.as_object().unwrap())?;
//! assert!(!String::from_utf8(bytes)?.contains("signature"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![deny(missing_docs)]

/// Canonicalization of flat JSON objects.
pub mod canonicalizer;
/// Signed-subset selection for bridge envelopes.
pub mod envelope;
/// Wire identifiers that participate in signing.
pub mod identifiers;
/// Validation helpers used by canonical types.
pub mod validation;

pub use canonicalizer::{CanonicalizationError, Canonicalizer};
pub use envelope::{signed_subset, signing_input, EnvelopeError, PayloadField};
pub use identifiers::{MessageKind, MessageType, RequestId};
pub use validation::ValidationError;
