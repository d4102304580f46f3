use std::sync::OnceLock;

use crate::validation::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};

macro_rules! newtype {
    ($name:ident, $doc:expr, $pattern:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            fn pattern() -> &'static Regex {
                static PATTERN: OnceLock<Regex> = OnceLock::new();
                PATTERN.get_or_init(|| Regex::new($pattern).expect("invalid regex"))
            }

            /// Parses a validated identifier from a string.
            pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if !Self::pattern().is_match(&s) {
                    return Err(ValidationError::PatternMismatch {
                        field: stringify!($name),
                        value: s,
                    });
                }
                Ok(Self(s))
            }

            /// Borrows the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

newtype!(
    RequestId,
    "Correlation identifier for one bridge call (pattern: `[A-Za-z0-9_-]{8,128}`).",
    r"^[A-Za-z0-9_-]{8,128}$"
);
newtype!(
    MessageType,
    "Bridge message type such as `portico:api:getAvatar` or `portico:api:getAvatar:response`.",
    r"^[a-z][a-z0-9_-]{0,31}:api:[A-Za-z][A-Za-z0-9]{0,63}(:response|:error)?$"
);

/// Direction/outcome encoded in the suffix of a [`MessageType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Content → host call.
    Request,
    /// Successful host → content answer (`:response`).
    Response,
    /// Failed host → content answer (`:error`).
    Error,
}

const RESPONSE_SUFFIX: &str = ":response";
const ERROR_SUFFIX: &str = ":error";

impl MessageType {
    /// Builds the request type for `method` under `domain`.
    pub fn request(domain: &str, method: &str) -> Result<Self, ValidationError> {
        Self::parse(format!("{domain}:api:{method}"))
    }

    /// Message kind derived from the type suffix.
    pub fn kind(&self) -> MessageKind {
        if self.0.ends_with(RESPONSE_SUFFIX) {
            MessageKind::Response
        } else if self.0.ends_with(ERROR_SUFFIX) {
            MessageKind::Error
        } else {
            MessageKind::Request
        }
    }

    /// Domain prefix (the part before `:api:`).
    pub fn domain(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }

    /// Method name (the segment after `:api:`).
    pub fn method(&self) -> &str {
        self.0.split(':').nth(2).unwrap_or_default()
    }

    /// The `:response` type answering this request type.
    pub fn response(&self) -> Self {
        Self(format!("{}{}", self.request_base(), RESPONSE_SUFFIX))
    }

    /// The `:error` type answering this request type.
    pub fn error(&self) -> Self {
        Self(format!("{}{}", self.request_base(), ERROR_SUFFIX))
    }

    fn request_base(&self) -> &str {
        self.0
            .strip_suffix(RESPONSE_SUFFIX)
            .or_else(|| self.0.strip_suffix(ERROR_SUFFIX))
            .unwrap_or(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_compile_once() {
        assert!(std::ptr::eq(RequestId::pattern(), RequestId::pattern()));
        assert!(std::ptr::eq(MessageType::pattern(), MessageType::pattern()));
        assert!(!std::ptr::eq(
            RequestId::pattern(),
            MessageType::pattern()
        ));
    }

    #[test]
    fn message_type_parts() {
        let ty = MessageType::parse("portico:api:getProfileDetails:response").unwrap();
        assert_eq!(ty.domain(), "portico");
        assert_eq!(ty.method(), "getProfileDetails");
        assert_eq!(ty.kind(), MessageKind::Response);
    }

    #[test]
    fn request_derives_answers() {
        let ty = MessageType::request("portico", "getAvatar").unwrap();
        assert_eq!(ty.kind(), MessageKind::Request);
        assert_eq!(ty.response().as_str(), "portico:api:getAvatar:response");
        assert_eq!(ty.error().as_str(), "portico:api:getAvatar:error");
        assert_eq!(ty.error().response().as_str(), "portico:api:getAvatar:response");
    }

    #[test]
    fn rejects_foreign_shapes() {
        assert!(MessageType::parse("console-log").is_err());
        assert!(MessageType::parse("portico:nav:back").is_err());
        assert!(MessageType::parse("portico:api:get avatar").is_err());
        assert!(RequestId::parse("short").is_err());
        assert!(RequestId::parse("0b6f1c2e-6a7d-4e4b-9d59-2f1f3f0f6a11").is_ok());
    }
}
