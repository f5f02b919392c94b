//! Durable persistence for the session credential.
//!
//! The credential survives reloads as two string entries under fixed keys;
//! absence of either entry is equivalent to "no session". The session store
//! is the only writer. Storage failures are reported as `Error::Storage` and
//! are never fatal to an in-memory session.

use crate::auth::models::Credential;
use crate::errors::{ClientResult, Error};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

const ACCESS_TOKEN_KEY: &str = "access_token";
const TOKEN_TYPE_KEY: &str = "token_type";

/// Durable key-value persistence for the bearer credential.
pub trait CredentialStorage: Send + Sync {
    /// Returns the stored credential, or `None` when either entry is missing.
    fn load(&self) -> ClientResult<Option<Credential>>;

    /// Persists both entries.
    fn save(&self, credential: &Credential) -> ClientResult<()>;

    /// Removes both entries. Removing an already absent credential succeeds.
    fn clear(&self) -> ClientResult<()>;
}

/// File-backed store holding the two entries as a small JSON document.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCredentialStore { path: path.into() }
    }

    fn read_entries(&self) -> ClientResult<BTreeMap<String, String>> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                Error::storage(format!(
                    "corrupt session file {}: {err}",
                    self.path.display()
                ))
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(Error::storage(format!(
                "cannot read session file {}: {err}",
                self.path.display()
            ))),
        }
    }

    /// Writes via a sibling temp file and rename, so a crash mid-write never
    /// leaves a truncated session file.
    fn write_entries(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                Error::storage(format!("cannot create {}: {err}", parent.display()))
            })?;
        }

        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|err| Error::storage(format!("cannot encode session entries: {err}")))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)
            .map_err(|err| Error::storage(format!("cannot write {}: {err}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|err| {
            Error::storage(format!(
                "cannot replace session file {}: {err}",
                self.path.display()
            ))
        })
    }
}

impl CredentialStorage for FileCredentialStore {
    fn load(&self) -> ClientResult<Option<Credential>> {
        let entries = self.read_entries()?;
        match (entries.get(ACCESS_TOKEN_KEY), entries.get(TOKEN_TYPE_KEY)) {
            (Some(access_token), Some(token_type)) => Ok(Some(Credential {
                access_token: access_token.clone(),
                token_type: token_type.clone(),
            })),
            _ => Ok(None),
        }
    }

    fn save(&self, credential: &Credential) -> ClientResult<()> {
        let mut entries = BTreeMap::new();
        entries.insert(ACCESS_TOKEN_KEY.to_string(), credential.access_token.clone());
        entries.insert(TOKEN_TYPE_KEY.to_string(), credential.token_type.clone());
        self.write_entries(&entries)
    }

    fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::storage(format!(
                "cannot remove session file {}: {err}",
                self.path.display()
            ))),
        }
    }
}

/// In-memory store for tests and for environments without durable storage;
/// the session then simply does not survive a reload.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStorage for MemoryCredentialStore {
    fn load(&self) -> ClientResult<Option<Credential>> {
        Ok(self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, credential: &Credential) -> ClientResult<()> {
        *self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self
            .credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential {
            access_token: "abc".to_string(),
            token_type: "Bearer".to_string(),
        }
    }

    #[test]
    fn missing_file_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("session.json"));

        store.save(&credential()).unwrap();
        assert_eq!(store.load().unwrap(), Some(credential()));
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.json"));

        store.save(&credential()).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing again must still succeed
        store.clear().unwrap();
    }

    #[test]
    fn missing_entry_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, br#"{"access_token":"abc"}"#).unwrap();

        let store = FileCredentialStore::new(path);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, b"not json").unwrap();

        let store = FileCredentialStore::new(path);
        assert!(matches!(store.load(), Err(Error::Storage { .. })));
    }

    #[test]
    fn memory_store_roundtrips() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save(&credential()).unwrap();
        assert_eq!(store.load().unwrap(), Some(credential()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
