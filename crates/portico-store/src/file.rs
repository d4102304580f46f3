//! Directory-backed secret store.
//!
//! Each key maps to one file whose name is the base64url encoding of the key
//! and whose content is the base64 encoding of the value. On Unix the files
//! are created with mode `0600`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::StoreError;
use crate::traits::SecretStore;

const ENTRY_EXTENSION: &str = "secret";

/// Secret store persisting entries as files in a single directory.
pub struct FileSecretStore {
    dir: PathBuf,
}

impl FileSecretStore {
    /// Opens (and creates if needed) the store directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", URL_SAFE_NO_PAD.encode(key), ENTRY_EXTENSION))
    }

    #[cfg(unix)]
    fn write_private(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn write_private(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
        fs::write(path, contents)?;
        Ok(())
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<Zeroizing<Vec<u8>>>, StoreError> {
        let encoded = match fs::read_to_string(self.entry_path(key)) {
            Ok(contents) => Zeroizing::new(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Some(Zeroizing::new(bytes)))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let encoded = Zeroizing::new(STANDARD.encode(value));
        Self::write_private(&self.entry_path(key), encoded.as_bytes())?;
        debug!(dir = %self.dir.display(), "stored secret entry");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
