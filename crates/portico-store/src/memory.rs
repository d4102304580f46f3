//! In-memory store implementations.

use std::collections::HashMap;
use std::path::Path;

use dashmap::DashMap;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::error::StoreError;
use crate::profile::{Avatar, Profile};
use crate::traits::{ProfileStore, SecretStore};

/// In-memory secret store (for tests and single-process hosts).
#[derive(Default)]
pub struct MemorySecretStore {
    entries: DashMap<String, Zeroizing<Vec<u8>>>,
}

impl MemorySecretStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Result<Option<Zeroizing<Vec<u8>>>, StoreError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries
            .insert(key.to_string(), Zeroizing::new(value.to_vec()));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProfileRecord {
    profile: Option<Profile>,
    avatar: Option<Avatar>,
}

/// In-memory profile store keyed by DID.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: DashMap<String, Profile>,
    avatars: DashMap<String, Avatar>,
}

impl MemoryProfileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads records from a JSON file shaped `{ "<did>": { "profile": …, "avatar": … } }`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Parses records from a JSON string (see [`from_json_file`](Self::from_json_file)).
    pub fn from_json_str(raw: &str) -> Result<Self, StoreError> {
        let records: HashMap<String, ProfileRecord> = serde_json::from_str(raw)?;
        let store = Self::new();
        for (did, record) in records {
            if let Some(profile) = record.profile {
                store.put_profile(&did, profile);
            }
            if let Some(avatar) = record.avatar {
                store.put_avatar(&did, avatar);
            }
        }
        Ok(store)
    }

    /// Stores or replaces the profile for `did`.
    pub fn put_profile(&self, did: &str, profile: Profile) {
        self.profiles.insert(did.to_string(), profile);
    }

    /// Stores or replaces the avatar for `did`.
    pub fn put_avatar(&self, did: &str, avatar: Avatar) {
        self.avatars.insert(did.to_string(), avatar);
    }

    /// Removes everything stored for `did`.
    pub fn remove(&self, did: &str) {
        self.profiles.remove(did);
        self.avatars.remove(did);
    }
}

impl ProfileStore for MemoryProfileStore {
    fn profile(&self, did: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.get(did).map(|p| p.value().clone()))
    }

    fn avatar(&self, did: &str) -> Result<Option<Avatar>, StoreError> {
        Ok(self.avatars.get(did).map(|a| a.value().clone()))
    }
}
