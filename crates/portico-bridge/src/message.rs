//! Bridge envelopes.
//!
//! A [`BridgeMessage`] keeps the raw JSON object it was built from or parsed
//! into, so the verifier always sees exactly the bytes the sender produced,
//! alongside validated `type` and `requestId` fields.

use portico_canonical::{MessageKind, MessageType, PayloadField, RequestId};
use serde_json::{Map, Value};

use crate::errors::BridgeError;

/// Body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// Identity assertion.
    Jwt(String),
    /// Plain value (`null` included).
    Result(Value),
}

impl ResponsePayload {
    /// The JWT, if this is an assertion payload.
    pub fn into_jwt(self) -> Option<String> {
        match self {
            ResponsePayload::Jwt(jwt) => Some(jwt),
            ResponsePayload::Result(_) => None,
        }
    }

    /// The value, if this is a result payload.
    pub fn into_result(self) -> Option<Value> {
        match self {
            ResponsePayload::Result(value) => Some(value),
            ResponsePayload::Jwt(_) => None,
        }
    }
}

/// A protocol message on the shared channel.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeMessage {
    fields: Map<String, Value>,
    message_type: MessageType,
    request_id: RequestId,
}

impl BridgeMessage {
    fn with_header(message_type: MessageType, request_id: RequestId, timestamp: i64) -> Self {
        let mut fields = Map::new();
        fields.insert("type".into(), Value::String(message_type.to_string()));
        fields.insert("requestId".into(), Value::String(request_id.to_string()));
        fields.insert("timestamp".into(), Value::from(timestamp));
        Self {
            fields,
            message_type,
            request_id,
        }
    }

    /// Content → host request. `params` are merged in; header fields win.
    pub fn request(
        message_type: MessageType,
        request_id: RequestId,
        timestamp: i64,
        params: Map<String, Value>,
    ) -> Self {
        let mut message = Self::with_header(message_type, request_id, timestamp);
        for (key, value) in params {
            message.fields.entry(key).or_insert(value);
        }
        message
    }

    /// Unsigned `:response` answering a request of `request_type`.
    pub fn response(
        request_type: &MessageType,
        request_id: &RequestId,
        timestamp: i64,
        payload: ResponsePayload,
    ) -> Self {
        let mut message =
            Self::with_header(request_type.response(), request_id.clone(), timestamp);
        match payload {
            ResponsePayload::Jwt(jwt) => message.fields.insert("jwt".into(), Value::String(jwt)),
            ResponsePayload::Result(value) => message.fields.insert("result".into(), value),
        };
        message
    }

    /// Unsigned `:error` answering a request of `request_type`.
    ///
    /// `assertion` is a signed error assertion; when present it becomes the
    /// signed payload while `error` stays untrusted display text.
    pub fn error(
        request_type: &MessageType,
        request_id: &RequestId,
        timestamp: i64,
        text: &str,
        assertion: Option<String>,
    ) -> Self {
        let mut message = Self::with_header(request_type.error(), request_id.clone(), timestamp);
        message
            .fields
            .insert("error".into(), Value::String(text.to_string()));
        if let Some(jwt) = assertion {
            message.fields.insert("jwt".into(), Value::String(jwt));
        }
        message
    }

    /// Parses a JSON object, validating `type` and `requestId`.
    pub fn from_value(value: Value) -> Result<Self, BridgeError> {
        let Value::Object(fields) = value else {
            return Err(BridgeError::MalformedMessage("not an object".into()));
        };
        let message_type = fields
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| BridgeError::MalformedMessage("missing type".into()))
            .and_then(|s| MessageType::parse(s).map_err(BridgeError::from))?;
        let request_id = fields
            .get("requestId")
            .and_then(Value::as_str)
            .ok_or_else(|| BridgeError::MalformedMessage("missing requestId".into()))
            .and_then(|s| RequestId::parse(s).map_err(BridgeError::from))?;
        Ok(Self {
            fields,
            message_type,
            request_id,
        })
    }

    /// Parses JSON text.
    pub fn from_json(raw: &str) -> Result<Self, BridgeError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| BridgeError::MalformedMessage(e.to_string()))?;
        Self::from_value(value)
    }

    /// Message type.
    pub fn message_type(&self) -> &MessageType {
        &self.message_type
    }

    /// Request/response/error, from the type suffix.
    pub fn kind(&self) -> MessageKind {
        self.message_type.kind()
    }

    /// Correlation id.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Sender timestamp (ms since epoch).
    pub fn timestamp(&self) -> Option<i64> {
        self.fields.get("timestamp").and_then(Value::as_i64)
    }

    /// Response payload: `jwt` if present, else `result`.
    ///
    /// `None` when the message carries neither field. An explicit
    /// `"result": null` is a payload.
    pub fn payload(&self) -> Option<ResponsePayload> {
        match PayloadField::select(&self.fields) {
            PayloadField::Jwt => Some(ResponsePayload::Jwt(
                self.jwt().map(str::to_string).unwrap_or_default(),
            )),
            PayloadField::Result => self
                .fields
                .get("result")
                .cloned()
                .map(ResponsePayload::Result),
            PayloadField::None => None,
        }
    }

    /// `jwt` field.
    pub fn jwt(&self) -> Option<&str> {
        self.fields.get("jwt").and_then(Value::as_str)
    }

    /// `error` display text.
    pub fn error_text(&self) -> Option<&str> {
        self.fields.get("error").and_then(Value::as_str)
    }

    /// Base64 signature, if the message is signed.
    pub fn signature(&self) -> Option<&str> {
        self.fields.get("signature").and_then(Value::as_str)
    }

    /// A request parameter.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The raw object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub(crate) fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    /// The raw object as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// JSON text for the channel.
    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id() -> RequestId {
        RequestId::parse("0b6f1c2e-6a7d-4e4b-9d59-2f1f3f0f6a11").unwrap()
    }

    #[test]
    fn request_params_cannot_override_header() {
        let ty = MessageType::request("portico", "requestPermission").unwrap();
        let mut params = Map::new();
        params.insert("permission".into(), json!("camera"));
        params.insert("type".into(), json!("portico:api:close"));

        let msg = BridgeMessage::request(ty, id(), 1, params);
        assert_eq!(msg.message_type().as_str(), "portico:api:requestPermission");
        assert_eq!(msg.param("permission"), Some(&json!("camera")));
        assert_eq!(msg.as_map()["type"], "portico:api:requestPermission");
    }

    #[test]
    fn error_envelope_shape() {
        let ty = MessageType::request("portico", "getProfileDetails").unwrap();
        let msg = BridgeMessage::error(&ty, &id(), 5, "No profile", None);
        assert_eq!(msg.kind(), MessageKind::Error);
        assert_eq!(msg.error_text(), Some("No profile"));
        assert!(msg.jwt().is_none());
    }

    #[test]
    fn explicit_null_result_is_a_value() {
        let msg = BridgeMessage::from_value(json!({
            "type": "portico:api:requestPermission:response",
            "requestId": id().as_str(),
            "timestamp": 3,
            "result": null
        }))
        .unwrap();
        assert_eq!(msg.payload(), Some(ResponsePayload::Result(Value::Null)));
    }

    #[test]
    fn missing_payload_is_not_null() {
        let msg = BridgeMessage::from_value(json!({
            "type": "portico:api:requestPermission:response",
            "requestId": id().as_str(),
            "timestamp": 3
        }))
        .unwrap();
        assert_eq!(msg.payload(), None);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(BridgeMessage::from_json("not json").is_err());
        assert!(BridgeMessage::from_json("[1,2]").is_err());
        assert!(BridgeMessage::from_json(r#"{"type":"portico:api:close"}"#).is_err());
        assert!(BridgeMessage::from_json(r#"{"type":"hello","requestId":"abcdefgh"}"#).is_err());
    }
}
