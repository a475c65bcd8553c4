//! String key-value storage backends
//!
//! Every access returns a `Result` so callers decide how a failure degrades.
//! `LocalStorage` wraps the browser's `window.localStorage`; `MemoryStore`
//! backs native builds and tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use thiserror::Error;

/// Failure reported by a storage backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// No backend could be obtained (private mode, sandboxed iframe, ...)
    #[error("storage backend unavailable")]
    Unavailable,

    #[error("failed to read `{key}`: {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },

    #[error("failed to remove `{key}`: {reason}")]
    Remove { key: String, reason: String },
}

impl StorageError {
    pub fn read(key: &str, reason: impl Into<String>) -> Self {
        Self::Read {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn write(key: &str, reason: impl Into<String>) -> Self {
        Self::Write {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn remove(key: &str, reason: impl Into<String>) -> Self {
        Self::Remove {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Minimal string key-value backend
///
/// Methods take `&self`: backends are shared between components on a single
/// thread and handle their own interior mutability, like `localStorage`.
pub trait KeyValueStore {
    /// Read a key. `Ok(None)` means the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write (or overwrite) a key
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend with optional failure injection
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail (simulates a throwing backend)
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Make every subsequent write and remove fail (quota exceeded, etc.)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.get() {
            return Err(StorageError::read(key, "injected read failure"));
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::write(key, "injected write failure"));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::remove(key, "injected remove failure"));
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Browser `localStorage` backend (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// Open `window.localStorage`
    pub fn open() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
fn js_reason(err: wasm_bindgen::JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::read(key, js_reason(e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::write(key, js_reason(e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::remove(key, js_reason(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a"), Ok(None));

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a"), Ok(Some("1".to_string())));

        store.remove("a").unwrap();
        assert_eq!(store.get("a"), Ok(None));
        // Removing twice is fine
        assert!(store.remove("a").is_ok());
    }

    #[test]
    fn test_memory_store_failure_injection() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();

        store.set_fail_reads(true);
        assert!(matches!(store.get("a"), Err(StorageError::Read { .. })));

        store.set_fail_writes(true);
        assert!(matches!(
            store.set("b", "2"),
            Err(StorageError::Write { .. })
        ));
        assert!(matches!(
            store.remove("a"),
            Err(StorageError::Remove { .. })
        ));

        store.set_fail_reads(false);
        store.set_fail_writes(false);
        assert_eq!(store.get("a"), Ok(Some("1".to_string())));
        assert_eq!(store.len(), 1);
    }
}
