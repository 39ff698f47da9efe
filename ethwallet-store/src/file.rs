//! File-backed plain key-value store.
//!
//! A small JSON document holding the full namespace, replaced atomically on
//! every mutation using the write-to-temp-then-rename pattern so a crash
//! mid-write leaves either the complete old content or the complete new
//! content on disk, never a torn file.

#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;

/// Current on-disk format version.
const STORE_FILE_VERSION: u32 = 1;

/// On-disk shape of the store: a version tag and the entry map.
///
/// The version is validated before the entries are used, so a future format
/// change fails loudly instead of silently misreading old data.
#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: HashMap<String, String>,
}

/// Plain key-value store persisted as a single JSON file.
///
/// Mutations are written through immediately; reads are served from the
/// in-memory copy loaded at open time. Suitable for the non-secret metadata
/// namespace on platforms without a native preferences store.
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileKeyValueStore {
    /// Opens the store at `path`, creating an empty namespace if the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, fails to
    /// parse, or carries an unsupported format version.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => {
                let file: StoreFile = serde_json::from_slice(&bytes).map_err(|err| {
                    StoreError::corrupted(format!("store file {}: {err}", path.display()))
                })?;
                if file.version != STORE_FILE_VERSION {
                    return Err(StoreError::corrupted(format!(
                        "store file version mismatch: expected {STORE_FILE_VERSION}, got {}",
                        file.version
                    )));
                }
                file.entries
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(StoreError::io("read store file", err)),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Writes the full namespace out atomically (temp file, then rename).
    fn persist(&self, entries: &HashMap<String, String>) -> StoreResult<()> {
        let file = StoreFile {
            version: STORE_FILE_VERSION,
            entries: entries.clone(),
        };
        let bytes = serde_json::to_vec(&file)
            .map_err(|err| StoreError::Serialization(err.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).map_err(|err| StoreError::io("write temp store file", err))?;
        fs::rename(&tmp, &self.path).map_err(|err| StoreError::io("replace store file", err))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap();
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&entries)
    }

    fn remove_many(&self, keys: &[&str]) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap();
        let mut changed = false;
        for key in keys {
            changed |= entries.remove(*key).is_some();
        }
        if changed {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn remove_all(&self) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.clear();
        self.persist(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("metadata.json");

        let store = FileKeyValueStore::open(&path).expect("open");
        store.set("walletAddress", "0xabc").unwrap();
        store.set("walletNetwork", "sepolia").unwrap();
        drop(store);

        let store = FileKeyValueStore::open(&path).expect("reopen");
        assert_eq!(store.get("walletAddress").unwrap().as_deref(), Some("0xabc"));
        assert_eq!(store.get("walletNetwork").unwrap().as_deref(), Some("sepolia"));
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileKeyValueStore::open(dir.path().join("never-written.json")).expect("open");
        assert!(store.get("anything").unwrap().is_none());
    }

    #[test]
    fn test_remove_and_remove_all_persist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("metadata.json");

        let store = FileKeyValueStore::open(&path).expect("open");
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();
        drop(store);

        let store = FileKeyValueStore::open(&path).expect("reopen");
        assert!(store.get("a").unwrap().is_none());
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));

        store.remove_all().unwrap();
        drop(store);

        let store = FileKeyValueStore::open(&path).expect("reopen");
        assert!(store.get("b").unwrap().is_none());
    }

    #[test]
    fn test_corrupted_file_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("metadata.json");
        fs::write(&path, b"not json at all").unwrap();

        let err = FileKeyValueStore::open(&path).map(|_| ()).unwrap_err();
        match err {
            StoreError::Corrupted(message) => assert!(message.contains("metadata.json")),
            other => panic!("expected corrupted error, got {other:?}"),
        }
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("metadata.json");
        fs::write(&path, br#"{"version":99,"entries":{}}"#).unwrap();

        let err = FileKeyValueStore::open(&path).map(|_| ()).unwrap_err();
        match err {
            StoreError::Corrupted(message) => assert!(message.contains("version mismatch")),
            other => panic!("expected corrupted error, got {other:?}"),
        }
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("metadata.json");

        let store = FileKeyValueStore::open(&path).expect("open");
        store.set("a", "1").unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("metadata.json")]);
    }
}
