//! Output formatting utilities.

use serde_json::Value;

/// Formats a value as pretty JSON.
pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a `label  value` line with the label padded to a fixed width.
pub fn format_field(label: &str, value: &str) -> String {
    format!("{:<12} {}", label, value)
}

/// Shortens long values (keys, tokens, profile JSON) for human output.
///
/// Lengths count characters, so multi-byte text is never split.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
