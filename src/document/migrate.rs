//! Legacy key migration
//!
//! Before the consolidated document existed, each widget stored its own flat
//! key. Those keys are folded into the nested shape once, on the first load
//! that finds no consolidated document.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::default_config;
use crate::storage::Persistence;

pub const LEGACY_SETTINGS_KEY: &str = "homepage-settings";
pub const LEGACY_THEME_KEY: &str = "homepage-theme";
pub const LEGACY_LAST_MODULE_KEY: &str = "last-active-module";
pub const LEGACY_BOOKMARKS_KEY: &str = "homepage-bookmarks";
pub const LEGACY_TODOS_KEY: &str = "homepage-todos";
pub const LEGACY_NOTES_KEY: &str = "homepage-notes";
pub const LEGACY_CALENDAR_KEY: &str = "homepage-calendar";

/// Every key consumed by [`migrate_legacy`]
pub const LEGACY_KEYS: [&str; 7] = [
    LEGACY_SETTINGS_KEY,
    LEGACY_THEME_KEY,
    LEGACY_LAST_MODULE_KEY,
    LEGACY_BOOKMARKS_KEY,
    LEGACY_TODOS_KEY,
    LEGACY_NOTES_KEY,
    LEGACY_CALENDAR_KEY,
];

/// Build a document from legacy keys, or `None` on a fresh install
pub fn migrate_legacy(persistence: &Persistence, now: DateTime<Utc>) -> Option<Value> {
    let found: Vec<&str> = LEGACY_KEYS
        .iter()
        .copied()
        .filter(|key| persistence.read_raw(key).is_some())
        .collect();

    if found.is_empty() {
        debug!("No legacy keys found");
        return None;
    }
    info!(keys = ?found, "Migrating legacy storage keys");

    let mut config = default_config(now);

    let old_settings: Map<String, Value> = persistence.read(LEGACY_SETTINGS_KEY, Map::new());
    let had_theme = old_settings.contains_key("theme");
    if let Some(settings) = config["settings"].as_object_mut() {
        settings.extend(old_settings);
    }

    if !had_theme {
        if let Some(Value::String(theme)) = persistence.read_raw(LEGACY_THEME_KEY) {
            config["settings"]["theme"] = Value::String(theme);
        }
    }

    let last_module: String = persistence.read(LEGACY_LAST_MODULE_KEY, "quote".to_string());
    config["data"]["lastActiveModule"] = Value::String(last_module);

    for (key, field) in [
        (LEGACY_BOOKMARKS_KEY, "bookmarks"),
        (LEGACY_TODOS_KEY, "todos"),
        (LEGACY_NOTES_KEY, "notes"),
    ] {
        let items: Vec<Value> = persistence.read(key, Vec::new());
        config["data"][field] = Value::Array(items);
    }

    let calendar: Map<String, Value> = persistence.read(LEGACY_CALENDAR_KEY, Map::new());
    for field in ["events", "countdowns"] {
        if let Some(Value::Array(items)) = calendar.get(field) {
            config["data"]["calendar"][field] = Value::Array(items.clone());
        }
    }

    Some(config)
}

/// Remove all legacy keys; returns how many removals succeeded
pub fn clear_legacy(persistence: &mut Persistence) -> usize {
    LEGACY_KEYS
        .iter()
        .filter(|key| persistence.remove(key))
        .count()
}
