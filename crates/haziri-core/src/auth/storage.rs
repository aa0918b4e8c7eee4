//! Durable key/value storage for the session entries.
//!
//! The session is persisted as four independently keyed entries rather than a
//! single blob. Backends only need string get/set/remove; the `SessionStore`
//! owns all knowledge of which keys exist and how a partial write is handled.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;

use crate::config::{Config, StorageBackend, APP_NAME};

/// Storage key for the bearer token
pub const ACCESS_TOKEN_KEY: &str = "haziri_admin_access_token";
/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "haziri_admin_refresh_token";
/// Storage key for the serialized user profile
pub const USER_KEY: &str = "haziri_admin_user";
/// Storage key for the token expiry timestamp
pub const EXPIRES_AT_KEY: &str = "haziri_admin_expires_at";

/// All session keys, in write order.
pub const SESSION_KEYS: [&str; 4] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY, EXPIRES_AT_KEY];

pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Build the backend selected in the config.
pub fn open_storage(config: &Config) -> Result<Box<dyn SessionStorage>> {
    match config.storage {
        StorageBackend::File => Ok(Box::new(FileStorage::new(config.session_dir()?)?)),
        StorageBackend::Keyring => Ok(Box::new(KeyringStorage::new(APP_NAME))),
    }
}

/// One file per key inside a private directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create session directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session entry {}", key))?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.entry_path(key), value)
            .with_context(|| format!("Failed to write session entry {}", key))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to remove session entry {}", key))?;
        }
        Ok(())
    }
}

/// Session entries in the OS keychain, one credential per key.
#[derive(Debug)]
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keyring entry")
    }
}

impl SessionStorage for KeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve session entry from keychain"),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .context("Failed to store session entry in keychain")
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete session entry from keychain"),
        }
    }
}

/// Process-local storage, used by tests and one-shot tooling.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

impl<S: SessionStorage + ?Sized> SessionStorage for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(storage: &dyn SessionStorage) {
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);

        storage.set(ACCESS_TOKEN_KEY, "abc").unwrap();
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        storage.set(ACCESS_TOKEN_KEY, "def").unwrap();
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("def"));

        storage.remove(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);

        // Idempotent
        storage.remove(ACCESS_TOKEN_KEY).unwrap();
    }

    #[test]
    fn test_memory_storage() {
        exercise(&MemoryStorage::new());
    }

    #[test]
    fn test_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session")).unwrap();
        exercise(&storage);
    }

    #[test]
    fn test_file_storage_keys_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.set(ACCESS_TOKEN_KEY, "token").unwrap();
        storage.set(EXPIRES_AT_KEY, "2030-01-01T00:00:00Z").unwrap();
        storage.remove(ACCESS_TOKEN_KEY).unwrap();

        assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(
            storage.get(EXPIRES_AT_KEY).unwrap().as_deref(),
            Some("2030-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStorage::new(dir.path().to_path_buf())
            .unwrap()
            .set(USER_KEY, r#"{"name":"Disha"}"#)
            .unwrap();

        let reopened = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(
            reopened.get(USER_KEY).unwrap().as_deref(),
            Some(r#"{"name":"Disha"}"#)
        );
    }
}
