//! Config store
//!
//! Owns the in-memory [`ConfigDocument`](crate::document) for a session.
//! Reads and writes hit memory immediately; persistence is deferred to the
//! [`SaveScheduler`] and happens when the host calls [`ConfigStore::tick`],
//! [`ConfigStore::flush`] or [`ConfigStore::force_save`].
//!
//! The store is an ordinary value: construct one per backend and share it
//! with `Arc` where several components need it.

pub mod clock;
pub mod error;
pub mod scheduler;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::document::{
    self, get_path, iso_timestamp, merge_with_defaults, migrate, set_path, CONFIG_KEY,
};
use crate::storage::{KeyValueStore, Persistence, STORAGE_PREFIX};

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ConfigError;
pub use scheduler::{FlushReason, SaveScheduler};

/// Default file name for exports
pub const EXPORT_FILE_NAME: &str = "config.json";

/// Store tuning knobs
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Storage key of the consolidated document
    pub storage_key: String,
    /// Delay after the first pending write before flushing
    pub debounce: Duration,
    /// Periodic flush interval, active while `preferences.autoSave` is true
    pub autosave_interval: Duration,
    /// Remove legacy keys after a successful migration
    pub clear_legacy_keys: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            storage_key: CONFIG_KEY.to_string(),
            debounce: Duration::milliseconds(500),
            autosave_interval: Duration::seconds(5),
            clear_legacy_keys: true,
        }
    }
}

/// Initialization state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initializing,
    Ready,
}

/// Read-only summary for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigStats {
    pub version: String,
    pub last_updated: String,
    /// Length in bytes of the compact JSON document
    pub data_size: usize,
    /// Whether periodic saves are scheduled
    pub autosave: bool,
    pub bookmarks_count: usize,
    pub todos_count: usize,
    pub notes_count: usize,
    pub events_count: usize,
    pub countdowns_count: usize,
}

struct Inner {
    lifecycle: Lifecycle,
    doc: Value,
    persistence: Persistence,
    scheduler: SaveScheduler,
}

/// The settings/config store
pub struct ConfigStore {
    inner: Mutex<Inner>,
    options: StoreOptions,
    clock: Arc<dyn Clock>,
}

impl ConfigStore {
    pub fn new(backend: Box<dyn KeyValueStore>, options: StoreOptions) -> Self {
        Self::with_clock(backend, options, Arc::new(SystemClock))
    }

    pub fn with_clock(
        backend: Box<dyn KeyValueStore>,
        options: StoreOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let scheduler = SaveScheduler::new(options.debounce);
        Self {
            inner: Mutex::new(Inner {
                lifecycle: Lifecycle::Uninitialized,
                doc: Value::Null,
                persistence: Persistence::new(backend),
                scheduler,
            }),
            options,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lock().lifecycle
    }

    /// Load the document once and return a snapshot of it
    ///
    /// Loading happens under the store lock, so a second caller racing the
    /// first waits for it and gets the same document instead of loading again.
    pub fn initialize(&self) -> Value {
        let mut inner = self.lock();
        self.ensure_ready(&mut inner);
        inner.doc.clone()
    }

    fn ensure_ready(&self, inner: &mut Inner) {
        if inner.lifecycle == Lifecycle::Ready {
            return;
        }
        inner.lifecycle = Lifecycle::Initializing;

        let key = self.options.storage_key.as_str();
        let stored = match inner.persistence.read_raw(key) {
            Some(value @ Value::Object(_)) => Some(value),
            Some(other) => {
                warn!(key, kind = json_kind(&other), "Stored config is not an object, discarding");
                None
            }
            None => None,
        };

        let now = self.clock.now();
        match stored {
            Some(stored) => {
                inner.doc = merge_with_defaults(&stored, now);
                info!(key, "Loaded config");
            }
            None => match migrate::migrate_legacy(&inner.persistence, now) {
                Some(migrated) => {
                    inner.doc = merge_with_defaults(&migrated, now);
                    if save_document(inner, key, now) && self.options.clear_legacy_keys {
                        let removed = migrate::clear_legacy(&mut inner.persistence);
                        debug!(removed, "Cleared legacy keys");
                    }
                    info!("Migrated legacy keys into config");
                }
                None => {
                    inner.doc = document::default_config(now);
                    info!("No stored config, using defaults");
                }
            },
        }

        inner.lifecycle = Lifecycle::Ready;
        self.sync_autosave(inner);
    }

    fn sync_autosave(&self, inner: &mut Inner) {
        let enabled = get_path(&inner.doc, "preferences.autoSave")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        let interval = enabled.then_some(self.options.autosave_interval);
        inner.scheduler.set_autosave(interval, self.clock.now());
    }

    /// Value at `path`, or `default` when missing or not yet initialized
    pub fn get(&self, path: &str, default: Value) -> Value {
        let inner = self.lock();
        if inner.lifecycle != Lifecycle::Ready {
            return default;
        }
        get_path(&inner.doc, path).cloned().unwrap_or(default)
    }

    /// Typed read; `None` when missing or of another shape
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let inner = self.lock();
        let value = get_path(&inner.doc, path)?.clone();
        serde_json::from_value(value).ok()
    }

    pub fn contains(&self, path: &str) -> bool {
        get_path(&self.lock().doc, path).is_some()
    }

    /// Copy of the whole document, `None` before initialization
    pub fn snapshot(&self) -> Option<Value> {
        let inner = self.lock();
        (inner.lifecycle == Lifecycle::Ready).then(|| inner.doc.clone())
    }

    /// Assign `value` at `path` in memory and queue a save
    pub fn set(&self, path: &str, value: Value) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        self.ensure_ready(&mut inner);

        set_path(&mut inner.doc, path, value)?;
        inner.scheduler.request(self.clock.now());
        if touches_preferences(path) {
            self.sync_autosave(&mut inner);
        }
        debug!(path, pending = inner.scheduler.pending(), "Queued save");
        Ok(())
    }

    /// Append an object to the list at `path`, stamping an `id` if missing
    ///
    /// Returns the entry's id. A missing list is created.
    pub fn push_item(&self, path: &str, item: Value) -> Result<i64, ConfigError> {
        let Value::Object(mut item) = item else {
            return Err(ConfigError::InvalidItem);
        };

        let mut inner = self.lock();
        self.ensure_ready(&mut inner);

        let id = match item.get("id").and_then(Value::as_i64) {
            Some(id) => id,
            None => {
                let id = self.clock.now().timestamp_millis();
                item.insert("id".to_string(), Value::from(id));
                id
            }
        };

        match get_path(&inner.doc, path) {
            None => set_path(&mut inner.doc, path, Value::Array(vec![Value::Object(item)]))?,
            Some(Value::Array(items)) => {
                let index = items.len().to_string();
                set_path(
                    &mut inner.doc,
                    &format!("{path}.{index}"),
                    Value::Object(item),
                )?;
            }
            Some(_) => return Err(ConfigError::NotACollection(path.to_string())),
        }

        inner.scheduler.request(self.clock.now());
        Ok(id)
    }

    /// Remove entries with `id` from the list at `path`; `true` if any matched
    pub fn remove_item(&self, path: &str, id: i64) -> Result<bool, ConfigError> {
        let mut inner = self.lock();
        self.ensure_ready(&mut inner);

        let Some(Value::Array(items)) = get_path(&inner.doc, path) else {
            return Err(ConfigError::NotACollection(path.to_string()));
        };

        let kept: Vec<Value> = items
            .iter()
            .filter(|item| item.get("id").and_then(Value::as_i64) != Some(id))
            .cloned()
            .collect();
        if kept.len() == items.len() {
            return Ok(false);
        }

        set_path(&mut inner.doc, path, Value::Array(kept))?;
        inner.scheduler.request(self.clock.now());
        Ok(true)
    }

    /// Number of writes waiting for the next flush
    pub fn pending_writes(&self) -> usize {
        self.lock().scheduler.pending()
    }

    /// Flush if the debounce window closed or autosave is due
    pub fn tick(&self) -> Option<FlushReason> {
        let mut inner = self.lock();
        if inner.lifecycle != Lifecycle::Ready {
            return None;
        }

        let now = self.clock.now();
        let reason = inner.scheduler.due(now)?;
        save_document(&mut inner, &self.options.storage_key, now);
        debug!(?reason, "Flushed config");
        Some(reason)
    }

    /// Persist pending writes now; `false` when nothing was pending or the
    /// write failed
    pub fn flush(&self) -> bool {
        let mut inner = self.lock();
        if inner.lifecycle != Lifecycle::Ready || inner.scheduler.pending() == 0 {
            return false;
        }
        save_document(&mut inner, &self.options.storage_key, self.clock.now())
    }

    /// Persist immediately regardless of pending state
    pub fn force_save(&self) -> bool {
        let mut inner = self.lock();
        self.ensure_ready(&mut inner);
        let saved = save_document(&mut inner, &self.options.storage_key, self.clock.now());
        if saved {
            info!("Config saved");
        }
        saved
    }

    /// Pretty-printed JSON of the current document
    pub fn export_config(&self) -> Result<String, ConfigError> {
        let mut inner = self.lock();
        self.ensure_ready(&mut inner);
        serde_json::to_string_pretty(&inner.doc).map_err(ConfigError::Serialize)
    }

    /// Write the export to `path` and return the JSON
    pub fn export_to<P: AsRef<Path>>(&self, path: P) -> Result<String, ConfigError> {
        let path = path.as_ref();
        let json = self.export_config()?;
        fs::write(path, &json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Exported config");
        Ok(json)
    }

    /// Replace the document with an imported one
    ///
    /// The text must be a JSON object whose `settings` and `data` are
    /// objects. Missing fields are backfilled from defaults and the result is
    /// persisted immediately. On error the current document is untouched.
    pub fn import_config(&self, text: &str) -> Result<(), ConfigError> {
        let imported: Value = serde_json::from_str(text).map_err(ConfigError::InvalidJson)?;
        validate_shape(&imported)?;

        let mut inner = self.lock();
        self.ensure_ready(&mut inner);

        let now = self.clock.now();
        inner.doc = merge_with_defaults(&imported, now);
        save_document(&mut inner, &self.options.storage_key, now);
        self.sync_autosave(&mut inner);
        info!("Imported config");
        Ok(())
    }

    /// Read `path` and import it
    pub fn import_from<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.import_config(&text)
    }

    /// Replace the document with defaults and persist immediately
    pub fn reset_config(&self) {
        let mut inner = self.lock();
        self.ensure_ready(&mut inner);

        let now = self.clock.now();
        inner.doc = document::default_config(now);
        save_document(&mut inner, &self.options.storage_key, now);
        self.sync_autosave(&mut inner);
        info!("Config reset to defaults");
    }

    /// Pretty JSON object of every `homepage-` key in storage
    ///
    /// Pending writes are flushed first so the dump matches memory.
    pub fn export_storage(&self) -> Result<String, ConfigError> {
        let mut inner = self.lock();
        if inner.lifecycle == Lifecycle::Ready && inner.scheduler.pending() > 0 {
            save_document(&mut inner, &self.options.storage_key, self.clock.now());
        }
        let dump = inner.persistence.dump(STORAGE_PREFIX);
        serde_json::to_string_pretty(&dump).map_err(ConfigError::Serialize)
    }

    /// Write back a dump made by [`export_storage`](Self::export_storage)
    ///
    /// Only `homepage-` keys are stored. The document is reloaded from
    /// storage afterwards, discarding unsaved changes. Returns the number of
    /// keys written.
    pub fn import_storage(&self, text: &str) -> Result<usize, ConfigError> {
        let dump: Value = serde_json::from_str(text).map_err(ConfigError::InvalidJson)?;
        let Value::Object(entries) = dump else {
            return Err(ConfigError::InvalidShape("root must be an object"));
        };

        let mut inner = self.lock();
        let written = inner.persistence.restore(&entries, STORAGE_PREFIX);
        self.reload(&mut inner);
        info!(written, "Imported storage dump");
        Ok(written)
    }

    /// Remove every key from storage and fall back to defaults in memory
    pub fn clear_storage(&self) -> bool {
        let mut inner = self.lock();
        let cleared = inner.persistence.clear();
        self.reload(&mut inner);
        info!(cleared, "Cleared storage");
        cleared
    }

    fn reload(&self, inner: &mut Inner) {
        inner.scheduler.mark_flushed(self.clock.now());
        inner.lifecycle = Lifecycle::Uninitialized;
        self.ensure_ready(inner);
    }

    /// Whether periodic saves are currently scheduled
    pub fn autosave_enabled(&self) -> bool {
        self.lock().scheduler.autosave_enabled()
    }

    /// Summary of the document; `None` before initialization
    pub fn stats(&self) -> Option<ConfigStats> {
        let inner = self.lock();
        if inner.lifecycle != Lifecycle::Ready {
            return None;
        }
        let doc = &inner.doc;

        let text = |path: &str| {
            get_path(doc, path)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let count = |path: &str| {
            get_path(doc, path)
                .and_then(Value::as_array)
                .map_or(0, Vec::len)
        };

        Some(ConfigStats {
            version: text("version"),
            last_updated: text("lastUpdated"),
            data_size: serde_json::to_string(doc).map_or(0, |s| s.len()),
            autosave: inner.scheduler.autosave_enabled(),
            bookmarks_count: count("data.bookmarks"),
            todos_count: count("data.todos"),
            notes_count: count("data.notes"),
            events_count: count("data.calendar.events"),
            countdowns_count: count("data.calendar.countdowns"),
        })
    }
}

fn touches_preferences(path: &str) -> bool {
    path.split('.').next() == Some("preferences")
}

/// Stamp, persist, and clear the queue. A failed write is logged by
/// `Persistence`; the document stays in memory either way.
fn save_document(inner: &mut Inner, key: &str, now: DateTime<Utc>) -> bool {
    inner.doc["lastUpdated"] = Value::String(iso_timestamp(now));
    let saved = inner.persistence.write(key, &inner.doc);
    if !saved {
        error!(key, "Config was not persisted, keeping in-memory copy");
    }
    inner.scheduler.mark_flushed(now);
    saved
}

fn validate_shape(config: &Value) -> Result<(), ConfigError> {
    let Value::Object(root) = config else {
        return Err(ConfigError::InvalidShape("root must be an object"));
    };
    if !root.get("settings").is_some_and(Value::is_object) {
        return Err(ConfigError::InvalidShape("'settings' must be an object"));
    }
    if !root.get("data").is_some_and(Value::is_object) {
        return Err(ConfigError::InvalidShape("'data' must be an object"));
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Shorthand for an empty JSON object, handy as a `get` default
pub fn empty_object() -> Value {
    Value::Object(Map::new())
}
