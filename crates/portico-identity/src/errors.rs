use thiserror::Error;

/// Identity error types.
#[derive(Error, Debug)]
pub enum IdentityError {
    /// String is not a well-formed `did:key` Ed25519 identifier.
    #[error("invalid DID: {0}")]
    InvalidDid(String),
    /// No private key is stored for the DID.
    #[error("no private key stored for {0}")]
    NoPrivateKey(String),
    /// The stored private key is unusable or belongs to another DID.
    #[error("stored private key for {0} is invalid")]
    InvalidPrivateKey(String),
    /// No profile is stored for the DID.
    #[error("no profile stored for {0}")]
    NoProfile(String),
    /// Token is not three base64url parts with JSON header and payload.
    #[error("invalid token: {0}")]
    InvalidToken(String),
    /// Header names an algorithm other than EdDSA.
    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// Ed25519 signature does not verify against the issuer key.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// Issuer differs from the expected DID.
    #[error("token issuer {actual} does not match expected {expected}")]
    IssuerMismatch {
        /// DID the caller expected.
        expected: String,
        /// DID found in the token.
        actual: String,
    },
    /// `exp` has passed.
    #[error("token expired at {exp} (now {now})")]
    Expired {
        /// Expiry (seconds since epoch).
        exp: i64,
        /// Verification time.
        now: i64,
    },
    /// `iat` lies in the future beyond the allowed skew.
    #[error("token issued in the future at {iat} (now {now})")]
    NotYetValid {
        /// Issue time (seconds since epoch).
        iat: i64,
        /// Verification time.
        now: i64,
    },
    /// Claims could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Backing store failure.
    #[error("store error: {0}")]
    Store(#[from] portico_store::StoreError),
}
