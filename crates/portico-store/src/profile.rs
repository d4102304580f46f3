use serde::{Deserialize, Serialize};

/// Social account linked to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Social {
    /// Platform name (e.g. "github").
    pub platform: String,
    /// Handle on that platform.
    pub handle: String,
}

/// Profile snapshot shared with mini apps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name.
    pub name: String,
    /// Optional short biography.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Linked social accounts.
    #[serde(default)]
    pub socials: Vec<Social>,
}

/// Avatar image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    /// Media type, e.g. `image/png`.
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}
