//! Appearance commands - render the stored settings

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use super::utils;
use homepage_config::appearance::applier::PREVIEW_DURATION_SECS;
use homepage_config::appearance::{resolve, Settings, SettingsApplier, StyleSheet};
use homepage_config::document::deep_merge;
use homepage_config::startup::determine_startup_module;
use homepage_config::store::{empty_object, ConfigStore};

fn stored_settings(store: &ConfigStore) -> Value {
    store.get("settings", empty_object())
}

/// Print the stylesheet for the stored settings
pub fn css(db: Option<&Path>, json: bool) -> Result<()> {
    let store = utils::open_store(db)?;
    let settings = stored_settings(&store);

    if json {
        let style = resolve(&Settings::from_value(&settings));
        println!("{}", serde_json::to_string_pretty(&style)?);
        return Ok(());
    }

    let mut applier = SettingsApplier::new(StyleSheet::new());
    applier.apply(&settings);
    print!("{}", applier.surface().to_css());
    Ok(())
}

/// Show the stylesheet with `overrides` applied on top of the stored
/// settings, without saving them
pub fn preview(db: Option<&Path>, overrides: &str, wait: bool) -> Result<()> {
    let overrides: Value =
        serde_json::from_str(overrides).context("Preview settings must be JSON")?;
    if !overrides.is_object() {
        bail!("Preview settings must be a JSON object");
    }

    let store = utils::open_store(db)?;
    let current = stored_settings(&store);
    let mut previewed = current.clone();
    deep_merge(&mut previewed, &overrides);

    let mut applier = SettingsApplier::new(StyleSheet::new());
    applier.apply(&current);
    applier.preview(&previewed);

    println!("{}", "Preview:".cyan());
    print!("{}", applier.surface().to_css());

    if wait {
        std::thread::sleep(Duration::from_secs(PREVIEW_DURATION_SECS as u64));
        if applier.tick() {
            println!();
            println!("{}", "Reverted:".cyan());
            print!("{}", applier.surface().to_css());
        }
    }
    Ok(())
}

/// Print the module a new tab would open
pub fn startup(db: Option<&Path>) -> Result<()> {
    let store = utils::open_store(db)?;
    let settings = Settings::from_value(&stored_settings(&store));
    let last_active = store.get("data.lastActiveModule", Value::Null);

    let module = determine_startup_module(&settings, last_active.as_str());
    println!("{}", module);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("storage.db");
        assert!(preview(Some(&db), "[1]", false).is_err());
        assert!(preview(Some(&db), "not json", false).is_err());
    }

    #[test]
    fn test_css_and_startup_on_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("storage.db");
        css(Some(&db), false).unwrap();
        css(Some(&db), true).unwrap();
        startup(Some(&db)).unwrap();
        preview(Some(&db), r#"{"theme": "dark"}"#, false).unwrap();
    }
}
