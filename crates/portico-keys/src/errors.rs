use thiserror::Error;

/// Errors raised by session key operations.
#[derive(Error, Debug)]
pub enum KeyError {
    /// No live session exists for the public key (never created or destroyed).
    #[error("no session key for {0}")]
    KeyNotFound(String),
    /// A public key could not be decoded as a SEC1 P-256 point.
    #[error("invalid session public key: {0}")]
    InvalidPublicKey(String),
    /// A signature could not be decoded.
    #[error("invalid signature encoding: {0}")]
    InvalidSignature(String),
    /// The message does not have the signed-envelope shape.
    #[error("envelope error: {0}")]
    Envelope(#[from] portico_canonical::EnvelopeError),
}
