//! Key/value persistence
//!
//! Records are stored as JSON strings under flat keys: LocalStorage in the
//! browser, an in-memory map natively and in tests. Callers treat every
//! failure as recoverable.

use std::cell::RefCell;
use std::collections::HashMap;

/// Storage failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,

    #[error("failed to read '{0}'")]
    Read(String),

    #[error("failed to write '{0}'")]
    Write(String),
}

/// Flat string key/value store
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Load and deserialize a JSON record. `Ok(None)` when the key is absent.
pub fn load_json<T: serde::de::DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Option<T>, String> {
    match storage.get(key) {
        Ok(Some(json)) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| e.to_string()),
        Ok(None) => Ok(None),
        Err(e) => Err(e.to_string()),
    }
}

/// Serialize and store a JSON record
pub fn save_json<T: serde::Serialize>(storage: &dyn Storage, key: &str, value: &T) -> Result<(), String> {
    let json = serde_json::to_string(value).map_err(|e| e.to_string())?;
    storage.set(key, &json).map_err(|e| e.to_string())
}

/// In-memory storage (native builds and tests)
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    read_only: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects every write
    pub fn read_only() -> Self {
        Self {
            items: RefCell::default(),
            read_only: true,
        }
    }

    pub fn with_item(self, key: &str, value: &str) -> Self {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        self
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Write(key.to_string()));
        }
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| StorageError::Read(key.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::Write(key.to_string()))
    }
}
