use portico_store::{FileSecretStore, SecretStore, StoreError};
use tempfile::TempDir;

#[test]
fn entries_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = FileSecretStore::open(temp_dir.path()).unwrap();
        store.set("did:key:z6MkAlice", &[7u8; 64]).unwrap();
    }

    let store = FileSecretStore::open(temp_dir.path()).unwrap();
    let value = store.get("did:key:z6MkAlice").unwrap().unwrap();
    assert_eq!(value.as_slice(), &[7u8; 64]);
}

#[test]
fn missing_entries_and_double_delete_are_fine() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSecretStore::open(temp_dir.path().join("nested/dir")).unwrap();

    assert!(store.get("absent").unwrap().is_none());
    store.set("k", b"v").unwrap();
    store.delete("k").unwrap();
    store.delete("k").unwrap();
    assert!(store.get("k").unwrap().is_none());
}

#[test]
fn keys_with_path_characters_stay_inside_the_directory() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSecretStore::open(temp_dir.path()).unwrap();
    store.set("../escape/attempt", b"v").unwrap();

    let entries: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(store.get("../escape/attempt").unwrap().unwrap().as_slice(), b"v");
}

#[test]
fn corrupt_entry_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSecretStore::open(temp_dir.path()).unwrap();
    store.set("k", b"v").unwrap();

    let entry = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    std::fs::write(&entry, "%%% not base64 %%%").unwrap();

    assert!(matches!(store.get("k"), Err(StoreError::Corrupt { .. })));
}

#[cfg(unix)]
#[test]
fn entries_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let store = FileSecretStore::open(temp_dir.path()).unwrap();
    store.set("k", b"v").unwrap();

    let entry = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    let mode = entry.metadata().unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
