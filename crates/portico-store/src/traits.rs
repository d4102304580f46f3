//! Storage traits.

use zeroize::Zeroizing;

use crate::error::StoreError;
use crate::profile::{Avatar, Profile};

/// Platform secure-storage contract.
///
/// Values are opaque bytes. Implementations must not log them, and readers
/// receive them wrapped in [`Zeroizing`] so copies are wiped on drop.
pub trait SecretStore: Send + Sync {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Zeroizing<Vec<u8>>>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Deletes `key`. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Read access to the profile data shared with mini apps.
pub trait ProfileStore: Send + Sync {
    /// The profile linked to `did`, if any.
    fn profile(&self, did: &str) -> Result<Option<Profile>, StoreError>;

    /// The avatar linked to `did`, if any.
    fn avatar(&self, did: &str) -> Result<Option<Avatar>, StoreError>;
}
