//! Document commands - read and edit values in the stored config

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;
use serde_json::Value;
use std::path::Path;

use super::utils;
use homepage_config::store::ConfigStore;

/// Load the config and persist it, creating the database if needed
pub fn init(db: Option<&Path>) -> Result<()> {
    let store = utils::open_store(db)?;
    if !store.force_save() {
        bail!("Config could not be written to storage");
    }

    let version = store.get("version", Value::Null);
    println!(
        "{} config {}",
        "Initialized:".green(),
        version.as_str().unwrap_or("(unknown version)")
    );
    Ok(())
}

/// Print the value at `path`, or the whole document
pub fn get(db: Option<&Path>, path: Option<&str>) -> Result<()> {
    let store = utils::open_store(db)?;
    println!("{}", lookup(&store, path)?);
    Ok(())
}

fn lookup(store: &ConfigStore, path: Option<&str>) -> Result<String> {
    let value = match path {
        Some(path) => {
            if !store.contains(path) {
                bail!("No value at '{path}'");
            }
            store.get(path, Value::Null)
        }
        None => store.snapshot().context("Config is not loaded")?,
    };

    Ok(match value {
        Value::String(s) => s,
        other => serde_json::to_string_pretty(&other)?,
    })
}

/// Assign a value and save
pub fn set(db: Option<&Path>, path: &str, raw: &str) -> Result<()> {
    let store = utils::open_store(db)?;
    let value = utils::parse_value(raw);
    store
        .set(path, value.clone())
        .with_context(|| format!("Failed to set '{path}'"))?;
    save(&store)?;

    println!("{} {} = {}", "Set:".green(), path, value);
    Ok(())
}

/// Append a JSON object to the list at `path`
pub fn add(db: Option<&Path>, path: &str, raw: &str) -> Result<()> {
    let store = utils::open_store(db)?;
    let item: Value = serde_json::from_str(raw).context("Item must be a JSON object")?;
    let id = store
        .push_item(path, item)
        .with_context(|| format!("Failed to add to '{path}'"))?;
    save(&store)?;

    println!("{} {} (id {})", "Added:".green(), path, id);
    Ok(())
}

/// Remove the entry with `id` from the list at `path`
pub fn remove(db: Option<&Path>, path: &str, id: i64) -> Result<()> {
    let store = utils::open_store(db)?;
    let removed = store
        .remove_item(path, id)
        .with_context(|| format!("Failed to remove from '{path}'"))?;

    if !removed {
        println!("{} no entry with id {} in {}", "Warning:".yellow(), id, path);
        return Ok(());
    }
    save(&store)?;

    println!("{} {} (id {})", "Removed:".green(), path, id);
    Ok(())
}

/// Flush queued writes before the process exits
fn save(store: &ConfigStore) -> Result<()> {
    if store.pending_writes() > 0 && !store.flush() {
        bail!("Config could not be written to storage");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_and_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("storage.db");

        set(Some(&db), "settings.theme", "dark").unwrap();
        set(Some(&db), "preferences.maxBackups", "3").unwrap();

        let store = utils::open_store(Some(&db)).unwrap();
        assert_eq!(store.get("settings.theme", Value::Null), json!("dark"));
        assert_eq!(store.get("preferences.maxBackups", Value::Null), json!(3));
        assert_eq!(lookup(&store, Some("settings.theme")).unwrap(), "dark");
    }

    #[test]
    fn test_lookup_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = utils::open_store(Some(&dir.path().join("storage.db"))).unwrap();
        assert!(lookup(&store, Some("settings.nope")).is_err());
    }

    #[test]
    fn test_add_and_remove_item() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("storage.db");

        add(Some(&db), "data.todos", r#"{"id": 7, "text": "ship it"}"#).unwrap();
        let store = utils::open_store(Some(&db)).unwrap();
        assert_eq!(store.get("data.todos.0.text", Value::Null), json!("ship it"));
        drop(store);

        remove(Some(&db), "data.todos", 7).unwrap();
        let store = utils::open_store(Some(&db)).unwrap();
        assert_eq!(store.get("data.todos", Value::Null), json!([]));
    }

    #[test]
    fn test_add_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("storage.db");
        assert!(add(Some(&db), "data.todos", "[1, 2]").is_err());
    }
}
