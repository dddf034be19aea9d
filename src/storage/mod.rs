//! Key-value persistence
//!
//! The homepage keeps everything in a flat string-keyed store with JSON
//! values, the same shape as the browser's `localStorage`. Backends implement
//! [`KeyValueStore`]; [`Persistence`] adds JSON (de)serialization and turns
//! every failure into a logged default.

pub mod memory;
pub mod sqlite;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, warn};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Prefix shared by every key the homepage owns
pub const STORAGE_PREFIX: &str = "homepage-";

/// Default file name for a raw storage dump
pub const STORAGE_DUMP_FILE_NAME: &str = "homepage-backup.json";

/// Errors raised by storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A synchronous string key-value store
pub trait KeyValueStore: Send {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;

    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// JSON adapter over a [`KeyValueStore`]
///
/// Reads fall back to a caller-supplied default and writes report success as
/// a `bool`. Nothing here returns an error: storage holds personalization
/// state only, so a failure is logged and dropped.
pub struct Persistence {
    backend: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Read and decode `key`, or return `default` when it is missing,
    /// undecodable, or the backend fails
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.read_raw(key) else {
            return default;
        };

        match serde_json::from_value(value) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(key, error = %e, "Stored value has unexpected shape, using default");
                default
            }
        }
    }

    /// Read `key` as untyped JSON; `None` when missing or unreadable
    pub fn read_raw(&self, key: &str) -> Option<Value> {
        let text = match self.backend.get_item(key) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                error!(key, error = %e, "Failed to read from storage");
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Stored value is not valid JSON, ignoring");
                None
            }
        }
    }

    /// Encode and store `value` under `key`
    pub fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                error!(key, error = %e, "Failed to serialize value for storage");
                return false;
            }
        };

        match self.backend.set_item(key, &text) {
            Ok(()) => true,
            Err(e) => {
                error!(key, error = %e, "Failed to write to storage");
                false
            }
        }
    }

    /// Delete `key`; missing keys count as success
    pub fn remove(&mut self, key: &str) -> bool {
        match self.backend.remove_item(key) {
            Ok(()) => true,
            Err(e) => {
                error!(key, error = %e, "Failed to remove from storage");
                false
            }
        }
    }

    /// All stored keys, empty on failure
    pub fn keys(&self) -> Vec<String> {
        self.backend.keys().unwrap_or_else(|e| {
            error!(error = %e, "Failed to list storage keys");
            Vec::new()
        })
    }

    /// Every key starting with `prefix` with its decoded value
    ///
    /// Values that fail to decode are kept as `null` so the key still shows up.
    pub fn dump(&self, prefix: &str) -> Map<String, Value> {
        self.keys()
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .map(|key| {
                let value = self.read_raw(&key).unwrap_or(Value::Null);
                (key, value)
            })
            .collect()
    }

    /// Write back the entries of `dump` whose key starts with `prefix`
    ///
    /// Other keys are skipped. Returns how many entries were stored.
    pub fn restore(&mut self, dump: &Map<String, Value>, prefix: &str) -> usize {
        let mut written = 0;
        for (key, value) in dump {
            if !key.starts_with(prefix) {
                debug!(key, "Skipping foreign key");
                continue;
            }
            if self.write(key, value) {
                written += 1;
            }
        }
        written
    }

    /// Remove every key; `false` if any removal failed
    pub fn clear(&mut self) -> bool {
        let keys = self.keys();
        keys.iter().fold(true, |ok, key| self.remove(key) && ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_missing_returns_default() {
        let persistence = Persistence::new(Box::new(MemoryStore::new()));
        let value: Vec<String> = persistence.read("homepage-todos", vec!["x".to_string()]);
        assert_eq!(value, vec!["x".to_string()]);
    }

    #[test]
    fn test_read_invalid_json_returns_default() {
        let store = MemoryStore::new();
        store.insert_raw("homepage-notes", "{not json");
        let persistence = Persistence::new(Box::new(store));

        let value: Value = persistence.read("homepage-notes", json!([]));
        assert_eq!(value, json!([]));
    }

    #[test]
    fn test_read_wrong_shape_returns_default() {
        let store = MemoryStore::new();
        store.insert_raw("last-active-module", "42");
        let persistence = Persistence::new(Box::new(store));

        let value: String = persistence.read("last-active-module", "quote".to_string());
        assert_eq!(value, "quote");
    }

    #[test]
    fn test_write_then_read() {
        let mut persistence = Persistence::new(Box::new(MemoryStore::new()));
        assert!(persistence.write("homepage-theme", "dark"));

        let theme: String = persistence.read("homepage-theme", "light".to_string());
        assert_eq!(theme, "dark");
    }

    #[test]
    fn test_write_over_quota_returns_false() {
        let store = MemoryStore::with_quota(16);
        let handle = store.clone();
        let mut persistence = Persistence::new(Box::new(store));

        let big = json!({ "notes": ["a fairly long note that does not fit"] });
        assert!(!persistence.write("homepage-config", &big));
        assert!(handle.get_raw("homepage-config").is_none());
    }

    #[test]
    fn test_dump_only_includes_prefixed_keys() {
        let store = MemoryStore::new();
        store.insert_raw("homepage-config", r#"{"version":"1.0.0"}"#);
        store.insert_raw("homepage-notes", "{broken");
        store.insert_raw("other-app", "1");
        let persistence = Persistence::new(Box::new(store));

        let dump = persistence.dump(STORAGE_PREFIX);
        assert_eq!(dump.len(), 2);
        assert_eq!(dump["homepage-config"], json!({ "version": "1.0.0" }));
        assert_eq!(dump["homepage-notes"], Value::Null);
        assert!(!dump.contains_key("other-app"));
    }

    #[test]
    fn test_restore_skips_foreign_keys() {
        let store = MemoryStore::new();
        let handle = store.clone();
        let mut persistence = Persistence::new(Box::new(store));

        let dump = json!({
            "homepage-theme": "dark",
            "homepage-todos": [{ "id": 1 }],
            "session-token": "secret",
        });
        let written = persistence.restore(dump.as_object().unwrap(), STORAGE_PREFIX);

        assert_eq!(written, 2);
        assert_eq!(handle.get_raw("homepage-theme").as_deref(), Some("\"dark\""));
        assert!(handle.get_raw("session-token").is_none());
    }

    #[test]
    fn test_restore_counts_only_successful_writes() {
        let mut persistence = Persistence::new(Box::new(MemoryStore::with_quota(40)));

        let dump = json!({
            "homepage-a": 1,
            "homepage-b": "a value far too long to fit in the remaining quota",
        });
        assert_eq!(persistence.restore(dump.as_object().unwrap(), STORAGE_PREFIX), 1);
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = MemoryStore::new();
        store.insert_raw("homepage-config", "{}");
        store.insert_raw("other-app", "1");
        let mut persistence = Persistence::new(Box::new(store));

        assert!(persistence.clear());
        assert!(persistence.keys().is_empty());
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let mut persistence = Persistence::new(Box::new(MemoryStore::new()));
        assert!(persistence.remove("does-not-exist"));
    }
}
