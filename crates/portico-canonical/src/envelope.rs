//! Signed-subset selection for bridge envelopes.
//!
//! A signature covers `type`, `requestId`, `timestamp` and exactly one payload
//! field: `jwt` when the envelope carries one, otherwise `result`. The `error`
//! text and the `signature` itself are never covered, and neither is anything
//! else a sender chose to attach.

use crate::{CanonicalizationError, Canonicalizer};
use serde_json::{Map, Value};

/// Envelope header fields covered by every signature.
pub const HEADER_FIELDS: [&str; 3] = ["type", "requestId", "timestamp"];

/// Payload field selected into the signed subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadField {
    /// `jwt` (identity assertion string).
    Jwt,
    /// `result` (any flat value, `null` included).
    Result,
    /// Neither field is present.
    None,
}

impl PayloadField {
    /// Wire name of the field, if any.
    pub fn name(self) -> Option<&'static str> {
        match self {
            PayloadField::Jwt => Some("jwt"),
            PayloadField::Result => Some("result"),
            PayloadField::None => None,
        }
    }

    /// Picks the payload field present in `message`; `jwt` wins over `result`.
    pub fn select(message: &Map<String, Value>) -> Self {
        if message.contains_key("jwt") {
            PayloadField::Jwt
        } else if message.contains_key("result") {
            PayloadField::Result
        } else {
            PayloadField::None
        }
    }
}

/// Errors raised when a message does not have the signed-envelope shape.
#[derive(thiserror::Error, Debug)]
pub enum EnvelopeError {
    /// A header field is missing.
    #[error("missing envelope field `{0}`")]
    MissingField(&'static str),
    /// A field has the wrong JSON type.
    #[error("envelope field `{field}` must be {expected}")]
    WrongType {
        /// Field name.
        field: &'static str,
        /// Expected JSON type.
        expected: &'static str,
    },
    /// Canonical encoding of the subset failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

fn expect_field<'a>(
    message: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, EnvelopeError> {
    message.get(field).ok_or(EnvelopeError::MissingField(field))
}

/// Extracts the signed subset of a bridge envelope.
pub fn signed_subset(message: &Map<String, Value>) -> Result<Map<String, Value>, EnvelopeError> {
    let ty = expect_field(message, "type")?;
    if !ty.is_string() {
        return Err(EnvelopeError::WrongType {
            field: "type",
            expected: "a string",
        });
    }
    let request_id = expect_field(message, "requestId")?;
    if !request_id.is_string() {
        return Err(EnvelopeError::WrongType {
            field: "requestId",
            expected: "a string",
        });
    }
    let timestamp = expect_field(message, "timestamp")?;
    if !(timestamp.is_u64() || timestamp.is_i64()) {
        return Err(EnvelopeError::WrongType {
            field: "timestamp",
            expected: "an integer",
        });
    }

    let mut subset = Map::new();
    for field in HEADER_FIELDS {
        if let Some(value) = message.get(field) {
            subset.insert(field.to_string(), value.clone());
        }
    }

    match PayloadField::select(message) {
        PayloadField::Jwt => {
            let jwt = &message["jwt"];
            if !jwt.is_string() {
                return Err(EnvelopeError::WrongType {
                    field: "jwt",
                    expected: "a string",
                });
            }
            subset.insert("jwt".to_string(), jwt.clone());
        }
        PayloadField::Result => {
            subset.insert("result".to_string(), message["result"].clone());
        }
        PayloadField::None => {}
    }

    Ok(subset)
}

/// Canonical bytes a bridge signature is computed over.
pub fn signing_input(message: &Map<String, Value>) -> Result<Vec<u8>, EnvelopeError> {
    let subset = signed_subset(message)?;
    Ok(Canonicalizer::new().canonicalize(&Value::Object(subset))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn error_text_and_extras_are_excluded() {
        let subset = signed_subset(&obj(json!({
            "type": "portico:api:getAvatar:error",
            "requestId": "req-00000001",
            "timestamp": 1,
            "error": "No avatar",
            "signature": "abc",
            "extra": "smuggled"
        })))
        .unwrap();
        let keys: Vec<_> = subset.keys().cloned().collect();
        assert_eq!(keys, vec!["requestId", "timestamp", "type"]);
    }

    #[test]
    fn explicit_null_result_is_signed() {
        let subset = signed_subset(&obj(json!({
            "type": "portico:api:requestPermission:response",
            "requestId": "req-00000001",
            "timestamp": 1,
            "result": null
        })))
        .unwrap();
        assert_eq!(subset.get("result"), Some(&Value::Null));
    }

    #[test]
    fn jwt_takes_precedence_over_result() {
        let subset = signed_subset(&obj(json!({
            "type": "portico:api:getAvatar:response",
            "requestId": "req-00000001",
            "timestamp": 1,
            "jwt": "a.b.c",
            "result": true
        })))
        .unwrap();
        assert!(subset.contains_key("jwt"));
        assert!(!subset.contains_key("result"));
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        let missing = signed_subset(&obj(json!({"type": "x", "requestId": "y"})));
        assert!(matches!(missing, Err(EnvelopeError::MissingField("timestamp"))));

        let float_ts = signed_subset(&obj(json!({
            "type": "x", "requestId": "y", "timestamp": 1.5
        })));
        assert!(matches!(
            float_ts,
            Err(EnvelopeError::WrongType { field: "timestamp", .. })
        ));

        let bad_jwt = signed_subset(&obj(json!({
            "type": "x", "requestId": "y", "timestamp": 1, "jwt": 7
        })));
        assert!(matches!(bad_jwt, Err(EnvelopeError::WrongType { field: "jwt", .. })));
    }

    #[test]
    fn nested_result_cannot_be_signed() {
        let err = signing_input(&obj(json!({
            "type": "x", "requestId": "y", "timestamp": 1, "result": {"a": 1}
        })))
        .unwrap_err();
        assert!(matches!(err, EnvelopeError::Canonicalization(_)));
    }
}
