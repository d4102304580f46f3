//! Typed view of the shared content ↔ host channel.
//!
//! The channel is untyped: page scripts, console forwarding and navigation
//! hooks all post into it. Only messages whose `type` belongs to the bridge
//! domain (`<domain>:api:…`) and parse as envelopes reach the protocol.

use serde_json::Value;

use crate::message::BridgeMessage;

/// One message seen on the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMessage {
    /// Forwarded console output (`{"type":"console","level":…,"message":…}`).
    Console {
        /// Console level (`log`, `warn`, …).
        level: String,
        /// Message text.
        message: String,
    },
    /// Navigation notice (`{"type":"navigation","url":…}`).
    Navigation {
        /// Destination URL.
        url: String,
    },
    /// Bridge protocol envelope.
    Bridge(BridgeMessage),
    /// Anything else, including unparseable text and malformed envelopes.
    Unrelated(Value),
}

impl ChannelMessage {
    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            ChannelMessage::Console { .. } => "console",
            ChannelMessage::Navigation { .. } => "navigation",
            ChannelMessage::Bridge(_) => "bridge",
            ChannelMessage::Unrelated(_) => "unrelated",
        }
    }
}

/// Classifies raw channel text.
///
/// Never fails: anything that is not recognisably a console, navigation or
/// bridge message of `domain` comes back as [`ChannelMessage::Unrelated`].
pub fn parse_channel_message(raw: &str, domain: &str) -> ChannelMessage {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => return ChannelMessage::Unrelated(Value::String(raw.to_string())),
    };

    let message_type = text_field(&value, "type").unwrap_or_default();

    match message_type.as_str() {
        "console" => match text_field(&value, "message") {
            Some(message) => ChannelMessage::Console {
                level: text_field(&value, "level").unwrap_or_else(|| "log".to_string()),
                message,
            },
            None => ChannelMessage::Unrelated(value),
        },
        "navigation" => match text_field(&value, "url") {
            Some(url) => ChannelMessage::Navigation { url },
            None => ChannelMessage::Unrelated(value),
        },
        ty if is_bridge_type(ty, domain) => match BridgeMessage::from_value(value.clone()) {
            Ok(message) => ChannelMessage::Bridge(message),
            Err(_) => ChannelMessage::Unrelated(value),
        },
        _ => ChannelMessage::Unrelated(value),
    }
}

fn text_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

fn is_bridge_type(ty: &str, domain: &str) -> bool {
    ty.strip_prefix(domain)
        .is_some_and(|rest| rest.starts_with(":api:"))
}
