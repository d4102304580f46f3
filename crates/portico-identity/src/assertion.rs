//! Identity assertions: compact EdDSA JWTs issued by a DID.
//!
//! ```text
//! base64url(header) "." base64url(claims) "." base64url(ed25519 signature)
//! ```
//!
//! The header is always `{"alg":"EdDSA","typ":"JWT"}`. Claims carry the
//! issuer DID, issue and expiry times in whole seconds, an optional audience
//! (the mini app the assertion is addressed to), the assertion type and a
//! type-specific `data` object.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::did::Did;
use crate::errors::IdentityError;

/// Lifetime of every issued assertion.
pub const ASSERTION_TTL_SECS: i64 = 120;

/// Default tolerance for issuers whose clock runs ahead of the verifier.
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 30;

const ALG: &str = "EdDSA";
const TYP: &str = "JWT";

/// JOSE header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
    /// Signature algorithm.
    pub alg: String,
    /// Token type.
    pub typ: String,
}

impl Default for JwtHeader {
    fn default() -> Self {
        Self {
            alg: ALG.to_string(),
            typ: TYP.to_string(),
        }
    }
}

/// What an assertion vouches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssertionKind {
    /// Profile details (`data` is the profile object).
    Profile,
    /// Avatar (`data` is `{mimeType, data}` or `{noContent: true}`).
    Avatar,
    /// Notice that the host closed the session.
    Disconnect,
    /// Host-side failure (`data` is `{code, message}`).
    Error,
}

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Issuer DID.
    pub iss: String,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Audience: the mini app the assertion is addressed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Assertion type.
    #[serde(rename = "type")]
    pub kind: AssertionKind,
    /// Type-specific payload.
    pub data: Value,
}

impl AssertionClaims {
    /// Builds claims issued by `issuer` at `iat`, expiring after the standard lifetime.
    pub fn new(issuer: &Did, kind: AssertionKind, data: Value, iat: i64) -> Self {
        Self {
            iss: issuer.as_str().to_string(),
            iat,
            exp: iat + ASSERTION_TTL_SECS,
            aud: None,
            kind,
            data,
        }
    }

    /// Sets the audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.aud = Some(audience.into());
        self
    }
}

/// Signs `claims` with `key` and returns the compact JWT.
pub fn sign_assertion(key: &SigningKey, claims: &AssertionClaims) -> Result<String, IdentityError> {
    let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&JwtHeader::default())?);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
    let signing_input = format!("{header}.{payload}");

    let signature: Signature = key.sign(signing_input.as_bytes());
    Ok(format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(signature.to_bytes())
    ))
}

struct TokenParts<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
}

impl<'a> TokenParts<'a> {
    fn split(token: &'a str) -> Result<Self, IdentityError> {
        let mut parts = token.split('.');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(header), Some(payload), Some(signature), None) => Ok(Self {
                header,
                payload,
                signature,
            }),
            _ => Err(IdentityError::InvalidToken(
                "expected three dot-separated parts".to_string(),
            )),
        }
    }

    fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.payload)
    }
}

fn decode_part<T: DeserializeOwned>(part: &str, what: &str) -> Result<T, IdentityError> {
    let raw = URL_SAFE_NO_PAD
        .decode(part)
        .map_err(|e| IdentityError::InvalidToken(format!("{what}: {e}")))?;
    serde_json::from_slice(&raw).map_err(|e| IdentityError::InvalidToken(format!("{what}: {e}")))
}

/// Reads the claims without checking the signature or validity window.
///
/// For display only; anything acted upon must go through
/// [`verify_assertion`].
pub fn decode_claims(token: &str) -> Result<AssertionClaims, IdentityError> {
    let parts = TokenParts::split(token)?;
    decode_part(parts.payload, "payload")
}

/// Verifies `token` against the current system time and the default skew.
pub fn verify_assertion(
    token: &str,
    expected_issuer: Option<&Did>,
) -> Result<AssertionClaims, IdentityError> {
    verify_assertion_at(
        token,
        expected_issuer,
        chrono::Utc::now().timestamp(),
        DEFAULT_CLOCK_SKEW_SECS,
    )
}

/// Verifies `token` as of `now` (seconds since epoch).
///
/// Checks, in order: shape, header algorithm, issuer DID, expected issuer,
/// Ed25519 signature, expiry and issue time. `exp` is strict; `iat` may lie
/// up to `clock_skew_secs` in the future.
pub fn verify_assertion_at(
    token: &str,
    expected_issuer: Option<&Did>,
    now: i64,
    clock_skew_secs: i64,
) -> Result<AssertionClaims, IdentityError> {
    let parts = TokenParts::split(token)?;

    let header: JwtHeader = decode_part(parts.header, "header")?;
    if header.alg != ALG {
        return Err(IdentityError::UnsupportedAlgorithm(header.alg));
    }

    let claims: AssertionClaims = decode_part(parts.payload, "payload")?;
    let issuer = Did::parse(claims.iss.clone())?;
    if let Some(expected) = expected_issuer {
        if expected != &issuer {
            return Err(IdentityError::IssuerMismatch {
                expected: expected.to_string(),
                actual: issuer.to_string(),
            });
        }
    }

    let raw_signature = URL_SAFE_NO_PAD
        .decode(parts.signature)
        .map_err(|_| IdentityError::InvalidSignature)?;
    let signature_bytes: [u8; 64] = raw_signature
        .as_slice()
        .try_into()
        .map_err(|_| IdentityError::InvalidSignature)?;
    let signature = Signature::from_bytes(&signature_bytes);
    issuer
        .verifying_key()?
        .verify_strict(parts.signing_input().as_bytes(), &signature)
        .map_err(|_| IdentityError::InvalidSignature)?;

    if now > claims.exp {
        return Err(IdentityError::Expired {
            exp: claims.exp,
            now,
        });
    }
    if claims.iat > now + clock_skew_secs {
        return Err(IdentityError::NotYetValid {
            iat: claims.iat,
            now,
        });
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::did::generate_did;
    use serde_json::json;

    const T0: i64 = 1_700_000_000;

    fn issue(kind: AssertionKind, data: Value, iat: i64) -> (Did, String) {
        let identity = generate_did();
        let key = SigningKey::from_keypair_bytes(&identity.private_key).unwrap();
        let claims = AssertionClaims::new(&identity.did, kind, data, iat).with_audience("app.example");
        let token = sign_assertion(&key, &claims).unwrap();
        (identity.did, token)
    }

    #[test]
    fn header_and_lifetime() {
        let (did, token) = issue(AssertionKind::Profile, json!({"name": "Alice"}), T0);

        let header_part = token.split('.').next().unwrap();
        let header: Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header_part).unwrap()).unwrap();
        assert_eq!(header, json!({"alg": "EdDSA", "typ": "JWT"}));

        let claims = verify_assertion_at(&token, Some(&did), T0, DEFAULT_CLOCK_SKEW_SECS).unwrap();
        assert_eq!(claims.exp - claims.iat, 120);
        assert_eq!(claims.iss, did.as_str());
        assert_eq!(claims.aud.as_deref(), Some("app.example"));
        assert_eq!(claims.kind, AssertionKind::Profile);
        assert_eq!(claims.data["name"], "Alice");
    }

    #[test]
    fn valid_until_exp_inclusive() {
        let (did, token) = issue(AssertionKind::Avatar, json!({"noContent": true}), T0);
        assert!(verify_assertion_at(&token, Some(&did), T0 + 120, 0).is_ok());
        assert!(matches!(
            verify_assertion_at(&token, Some(&did), T0 + 121, DEFAULT_CLOCK_SKEW_SECS),
            Err(IdentityError::Expired { .. })
        ));
    }

    #[test]
    fn future_iat_is_bounded_by_skew() {
        let (did, token) = issue(AssertionKind::Profile, json!({}), T0 + 30);
        assert!(verify_assertion_at(&token, Some(&did), T0, 30).is_ok());
        assert!(matches!(
            verify_assertion_at(&token, Some(&did), T0, 29),
            Err(IdentityError::NotYetValid { .. })
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let (did, token) = issue(AssertionKind::Profile, json!({"name": "Alice"}), T0);
        let parts: Vec<&str> = token.split('.').collect();

        let mut claims = decode_claims(&token).unwrap();
        claims.data = json!({"name": "Mallory"});
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(matches!(
            verify_assertion_at(&forged, Some(&did), T0, 0),
            Err(IdentityError::InvalidSignature)
        ));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let (_, token) = issue(AssertionKind::Profile, json!({}), T0);
        let other = generate_did().did;
        assert!(matches!(
            verify_assertion_at(&token, Some(&other), T0, 0),
            Err(IdentityError::IssuerMismatch { .. })
        ));
    }

    #[test]
    fn issuer_swap_breaks_signature() {
        let (_, token) = issue(AssertionKind::Profile, json!({}), T0);
        let parts: Vec<&str> = token.split('.').collect();
        let other = generate_did().did;

        let mut claims = decode_claims(&token).unwrap();
        claims.iss = other.to_string();
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let forged = format!("{}.{}.{}", parts[0], payload, parts[2]);

        assert!(matches!(
            verify_assertion_at(&forged, None, T0, 0),
            Err(IdentityError::InvalidSignature)
        ));
    }

    #[test]
    fn other_algorithms_are_refused() {
        let (did, token) = issue(AssertionKind::Profile, json!({}), T0);
        let parts: Vec<&str> = token.split('.').collect();
        let none_header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let forged = format!("{}.{}.{}", none_header, parts[1], parts[2]);
        assert!(matches!(
            verify_assertion_at(&forged, Some(&did), T0, 0),
            Err(IdentityError::UnsupportedAlgorithm(alg)) if alg == "none"
        ));
    }

    #[test]
    fn malformed_tokens() {
        for token in ["", "a.b", "a.b.c.d", "!!!.e30.c2ln"] {
            assert!(
                matches!(
                    verify_assertion_at(token, None, T0, 0),
                    Err(IdentityError::InvalidToken(_))
                ),
                "token {token:?}"
            );
        }
    }
}
