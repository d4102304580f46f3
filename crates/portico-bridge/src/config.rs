//! Bridge configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::BridgeError;

/// Default message domain.
pub const DEFAULT_DOMAIN: &str = "portico";
/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
/// Default tolerated clock difference between host and content.
pub const DEFAULT_CLOCK_SKEW_SECS: i64 = 30;

/// Capability descriptor delivered synchronously to content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentDescriptor {
    /// Host application name.
    pub name: String,
    /// Host application version.
    pub version: String,
    /// Operating system the host runs on.
    pub platform: String,
    /// Permissions content may request.
    pub supported_permissions: Vec<String>,
}

impl Default for EnvironmentDescriptor {
    fn default() -> Self {
        Self {
            name: "Portico".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: std::env::consts::OS.to_string(),
            supported_permissions: vec![
                "camera".to_string(),
                "location".to_string(),
                "notifications".to_string(),
            ],
        }
    }
}

impl EnvironmentDescriptor {
    /// Whether `permission` is listed as supported.
    pub fn supports(&self, permission: &str) -> bool {
        self.supported_permissions.iter().any(|p| p == permission)
    }
}

/// Settings shared by the host and content halves of the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Message type prefix (`<domain>:api:<method>`).
    pub domain: String,
    /// How long a call waits for a valid response.
    pub request_timeout_ms: u64,
    /// Tolerated clock difference, applied to response timestamps.
    pub clock_skew_secs: i64,
    /// Descriptor handed to content at load time.
    pub environment: EnvironmentDescriptor,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
            environment: EnvironmentDescriptor::default(),
        }
    }
}

impl BridgeConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, BridgeError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| BridgeError::Config(e.to_string()))?;
        if config.clock_skew_secs < 0 {
            return Err(BridgeError::Config(format!(
                "clock_skew_secs must not be negative (got {})",
                config.clock_skew_secs
            )));
        }
        Ok(config)
    }

    /// Reads a JSON config file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, BridgeError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Clock skew in milliseconds (envelope timestamps are ms). Negative
    /// values count as zero.
    pub fn clock_skew_ms(&self) -> i64 {
        self.clock_skew_secs.max(0).saturating_mul(1000)
    }
}
