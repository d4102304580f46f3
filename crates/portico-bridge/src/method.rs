//! Fixed method contract.
//!
//! Every method answers through exactly one payload field: assertions come
//! back as `jwt`, plain values as `result`.

use portico_canonical::PayloadField;

/// Protocol methods content may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeMethod {
    /// Signed profile assertion.
    GetProfileDetails,
    /// Signed avatar assertion.
    GetAvatar,
    /// Permission grant (`result: bool`).
    RequestPermission,
    /// End the session (signed disconnect notice).
    Close,
}

impl BridgeMethod {
    /// All methods.
    pub const ALL: [BridgeMethod; 4] = [
        BridgeMethod::GetProfileDetails,
        BridgeMethod::GetAvatar,
        BridgeMethod::RequestPermission,
        BridgeMethod::Close,
    ];

    /// Wire name.
    pub fn name(self) -> &'static str {
        match self {
            BridgeMethod::GetProfileDetails => "getProfileDetails",
            BridgeMethod::GetAvatar => "getAvatar",
            BridgeMethod::RequestPermission => "requestPermission",
            BridgeMethod::Close => "close",
        }
    }

    /// Looks up a method by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Payload field a successful response carries.
    pub fn payload(self) -> PayloadField {
        match self {
            BridgeMethod::RequestPermission => PayloadField::Result,
            _ => PayloadField::Jwt,
        }
    }
}

impl std::fmt::Display for BridgeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve() {
        for method in BridgeMethod::ALL {
            assert_eq!(BridgeMethod::from_name(method.name()), Some(method));
        }
        assert_eq!(BridgeMethod::from_name("getWallet"), None);
    }

    #[test]
    fn only_permission_returns_result() {
        assert_eq!(BridgeMethod::RequestPermission.payload(), PayloadField::Result);
        assert_eq!(BridgeMethod::Close.payload(), PayloadField::Jwt);
        assert_eq!(BridgeMethod::GetAvatar.payload(), PayloadField::Jwt);
    }
}
